/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX 4.4 order client.
//!
//! Uses a plain blocking socket: outgoing messages go out with
//! [`VectoredWriter`] so field bytes are never assembled into a buffer, and
//! replies are cut with [`frame_len`] and deserialized in place.
//!
//! ```text
//! cargo run -p flashfix-example --example fix44_server
//! cargo run -p flashfix-example --example fix44_client
//! ```

use std::io::Read;
use std::net::TcpStream;

use anyhow::{Context, bail};
use flashfix::core::Message;
use flashfix::tagvalue::{Decoder, frame_len};
use flashfix::transport::VectoredWriter;
use flashfix_example::{
    ExampleConfig, Order, StandardHeader, init_logging, logon, logout, msg_type,
    new_order_single, tags,
};
use tracing::{debug, info};

const ORDERS: [(&str, &str, &str, &str); 3] = [
    ("AAPL", "1", "100", "187.25"),
    ("MSFT", "2", "50", "410.10"),
    ("NVDA", "1", "25", "121.00"),
];

fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::client();
    info!("Connecting to {}", cfg.addr());

    let mut stream = TcpStream::connect(cfg.addr())
        .with_context(|| format!("cannot connect to {}", cfg.addr()))?;
    stream.set_nodelay(true)?;

    let decoder = Decoder::new();
    info!("Checksum strategy: {}", decoder.strategy());
    let mut inbox = Vec::with_capacity(4096);
    let mut seq = 1u64;

    let header = StandardHeader::new(&cfg, seq);
    let mut message: Message<'_> = Message::new();
    logon(&header, &mut message)?;
    send(&mut stream, &message)?;
    expect_reply(&mut stream, &mut inbox, &decoder, msg_type::LOGON)?;
    info!("Logged in");

    for (n, (symbol, side, quantity, price)) in ORDERS.iter().enumerate() {
        seq += 1;
        let cl_ord_id = (n + 1).to_string();
        let header = StandardHeader::new(&cfg, seq);
        let order = Order {
            cl_ord_id: cl_ord_id.as_bytes(),
            symbol: symbol.as_bytes(),
            side: side.as_bytes(),
            quantity: quantity.as_bytes(),
            price: price.as_bytes(),
        };
        let mut message: Message<'_> = Message::new();
        new_order_single(&header, &order, &mut message)?;
        send(&mut stream, &message)?;
        expect_reply(&mut stream, &mut inbox, &decoder, msg_type::EXECUTION_REPORT)?;
    }

    seq += 1;
    let header = StandardHeader::new(&cfg, seq);
    let mut message: Message<'_> = Message::new();
    logout(&header, &mut message)?;
    send(&mut stream, &message)?;
    expect_reply(&mut stream, &mut inbox, &decoder, msg_type::LOGOUT)?;
    info!("Logged out");
    Ok(())
}

fn send(stream: &mut TcpStream, message: &Message<'_>) -> anyhow::Result<()> {
    let mut writer = VectoredWriter::for_message(message)?;
    let progress = writer.write_to(stream)?;
    debug!(
        checksum = writer.frame().checksum(),
        ?progress,
        "sent {} bytes",
        writer.written()
    );
    Ok(())
}

/// Reads one frame, checks its MsgType and logs it.
fn expect_reply(
    stream: &mut TcpStream,
    inbox: &mut Vec<u8>,
    decoder: &Decoder,
    expected: &[u8],
) -> anyhow::Result<()> {
    let len = read_frame(stream, inbox)?;
    {
        let mut reply: Message<'_> = Message::new();
        decoder.deserialize(&mut inbox[..len], &mut reply)?;

        let value = |tag: &[u8]| String::from_utf8_lossy(reply.get_value(tag).unwrap_or_default());
        if reply.get_value(tags::MSG_TYPE) != Some(expected) {
            bail!(
                "expected MsgType {}, got {}",
                String::from_utf8_lossy(expected),
                value(tags::MSG_TYPE)
            );
        }
        if expected == msg_type::EXECUTION_REPORT {
            info!(
                order_id = %value(tags::ORDER_ID),
                symbol = %value(tags::SYMBOL),
                leaves_qty = %value(tags::LEAVES_QTY),
                "Execution report"
            );
        }
    }
    inbox.drain(..len);
    Ok(())
}

/// Reads until `inbox` holds a whole frame and returns its length.
fn read_frame(stream: &mut TcpStream, inbox: &mut Vec<u8>) -> anyhow::Result<usize> {
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(len) = frame_len(inbox)?
            && inbox.len() >= len
        {
            return Ok(len);
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            bail!("server closed the connection");
        }
        inbox.extend_from_slice(&chunk[..n]);
    }
}
