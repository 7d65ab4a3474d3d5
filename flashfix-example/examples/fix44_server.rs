/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX 4.4 order server.
//!
//! Frames arrive through [`FixCodec`], are deserialized in place inside the
//! receive buffer, and every NewOrderSingle is acknowledged with an
//! ExecutionReport whose values are borrowed straight from the order.
//!
//! ```text
//! cargo run -p flashfix-example --example fix44_server
//! ```

use flashfix::core::Message;
use flashfix::transport::FixCodec;
use flashfix_example::{
    ExampleConfig, ExecIds, StandardHeader, execution_report, init_logging, logon, logout,
    msg_type, tags,
};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::server();
    info!("Starting FIX.4.4 server on {}", cfg.addr());

    let listener = TcpListener::bind(cfg.addr()).await?;

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("Connection from {}", addr);
        let cfg = cfg.clone();
        tokio::spawn(async move {
            if let Err(e) = handle(socket, cfg).await {
                error!("Session with {} failed: {:#}", addr, e);
            }
        });
    }
}

async fn handle(socket: TcpStream, cfg: ExampleConfig) -> anyhow::Result<()> {
    socket.set_nodelay(true)?;
    let (rd, wr) = socket.into_split();
    let mut frames = FramedRead::new(rd, FixCodec::new());
    let mut sink = FramedWrite::new(wr, FixCodec::new());
    let decoder = frames.decoder().frame_decoder();
    let mut seq = 1u64;

    while let Some(frame) = frames.next().await {
        let mut frame = frame?;
        let mut request: Message<'_> = Message::new();
        decoder.deserialize(&mut frame[..], &mut request)?;

        let header = StandardHeader::new(&cfg, seq);
        let ids: ExecIds;
        let mut reply: Message<'_> = Message::new();

        match request.get_value(tags::MSG_TYPE) {
            Some(msg_type::LOGON) => {
                info!("Client logged in");
                logon(&header, &mut reply)?;
            }
            Some(msg_type::NEW_ORDER_SINGLE) => {
                let cl_ord_id = request.get_value(tags::CL_ORD_ID).unwrap_or_default();
                ids = ExecIds::for_order(cl_ord_id);
                execution_report(&header, &ids, &request, &mut reply)?;
                info!(
                    cl_ord_id = %String::from_utf8_lossy(cl_ord_id),
                    order_id = %ids.order_id,
                    "Order acknowledged"
                );
            }
            Some(msg_type::LOGOUT) => {
                logout(&header, &mut reply)?;
                sink.send(&reply).await?;
                info!("Client logged out");
                return Ok(());
            }
            other => {
                warn!(
                    "Unhandled message type {:?}",
                    other.map(String::from_utf8_lossy)
                );
                continue;
            }
        }

        sink.send(&reply).await?;
        seq += 1;
    }

    info!("Connection closed");
    Ok(())
}
