/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! In-memory tour of the codec.
//!
//! Serializes an order three ways (raw body plus `finalize`, framed, and
//! vectored), checks they agree, then pushes the bytes through
//! [`FixCodec`] over an in-memory duplex pipe and deserializes them in place.
//!
//! ```text
//! cargo run -p flashfix-example --example loopback
//! ```

use anyhow::ensure;
use flashfix::core::Message;
use flashfix::core::wire::TRAILER_LEN;
use flashfix::tagvalue::{
    Strategy, VectoredFrame, calculate_checksum, checksum_with, deserialize, finalize, framed_len,
    header_len, is_complete, serialize, serialize_framed,
};
use flashfix::transport::FixCodec;
use flashfix_example::{ExampleConfig, Order, StandardHeader, init_logging, new_order_single, tags};
use futures::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Detected strategy: {}", Strategy::detect());

    let cfg = ExampleConfig::client();
    let header = StandardHeader::new(&cfg, 1);
    let order = Order {
        cl_ord_id: b"LOOP-1",
        symbol: b"AAPL",
        side: b"1",
        quantity: b"100",
        price: b"187.25",
    };
    let mut message: Message<'_> = Message::new();
    new_order_single(&header, &order, &mut message)?;

    // Framed in one call.
    let mut framed = vec![0u8; framed_len(&message)];
    let len = serialize_framed(&message, &mut framed)?;
    info!(len, "framed: {}", String::from_utf8_lossy(&framed).replace('\x01', "|"));

    // Body first, then shifted to make room for the header.
    let body_len = message.body_len();
    let mut staged = vec![0u8; framed_len(&message)];
    let written = serialize(&message, &mut staged)?;
    ensure!(written == body_len, "body length mismatch");
    let finalized = finalize(&mut staged, body_len)?;
    ensure!(finalized == header_len(body_len) + body_len + TRAILER_LEN, "bad framed length");
    ensure!(staged[..finalized] == framed[..], "finalize differs from serialize_framed");

    // Vectored.
    let frame = VectoredFrame::new(&message)?;
    ensure!(frame.to_vec() == framed, "vectored frame differs");
    info!(
        segments = frame.segments().count(),
        checksum = frame.checksum(),
        "vectored frame matches"
    );

    let trailer_start = len - TRAILER_LEN;
    let expected = calculate_checksum(&framed[..trailer_start]);
    for strategy in Strategy::ALL.into_iter().filter(|s| s.is_supported()) {
        ensure!(
            checksum_with(strategy, &framed[..trailer_start]) == expected,
            "{strategy} checksum differs"
        );
    }
    ensure!(is_complete(&framed, len), "trailer not found");
    ensure!(!is_complete(&framed, trailer_start), "truncated frame reported complete");

    // Through the Tokio codec, split into two writes on the wire.
    let (client, server) = tokio::io::duplex(64);
    let mut sink = FramedWrite::new(client, FixCodec::new());
    let mut stream = FramedRead::new(server, FixCodec::new());
    let (sent, received) = tokio::join!(
        async {
            sink.send(&framed[..len / 2]).await?;
            sink.send(&framed[len / 2..]).await?;
            sink.send(&message).await
        },
        async {
            let first = stream.next().await;
            let second = stream.next().await;
            (first, second)
        }
    );
    sent?;

    let (Some(first), Some(second)) = received else {
        anyhow::bail!("stream ended early");
    };
    for mut frame in [first?, second?] {
        let mut decoded: Message<'_> = Message::new();
        let consumed = deserialize(&mut frame[..], &mut decoded)?;
        ensure!(consumed == len, "unexpected frame length {consumed}");
        ensure!(
            decoded.get_value(tags::SYMBOL) == Some(&b"AAPL"[..]),
            "symbol lost in transit"
        );
        info!(consumed, fields = decoded.len(), "decoded in place");
    }

    Ok(())
}
