/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Shared pieces for the FlashFix examples.
//!
//! Connection settings come from the environment, logging goes through
//! `tracing-subscriber`, and the message builders below borrow every value
//! they put on the wire, so an outgoing message is just a list of slices.

use flashfix::core::{EncodeError, Message};
use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default server port.
pub const DEFAULT_PORT: u16 = 9876;

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Heartbeat interval announced on Logon, in seconds.
pub const HEARTBEAT_INTERVAL: &[u8] = b"30";

/// Tags used by the examples.
pub mod tags {
    pub const AVG_PX: &[u8] = b"6";
    pub const CL_ORD_ID: &[u8] = b"11";
    pub const CUM_QTY: &[u8] = b"14";
    pub const MSG_SEQ_NUM: &[u8] = b"34";
    pub const MSG_TYPE: &[u8] = b"35";
    pub const ORDER_ID: &[u8] = b"37";
    pub const ORDER_QTY: &[u8] = b"38";
    pub const ORD_STATUS: &[u8] = b"39";
    pub const ORD_TYPE: &[u8] = b"40";
    pub const PRICE: &[u8] = b"44";
    pub const SENDER_COMP_ID: &[u8] = b"49";
    pub const SENDING_TIME: &[u8] = b"52";
    pub const SIDE: &[u8] = b"54";
    pub const SYMBOL: &[u8] = b"55";
    pub const TARGET_COMP_ID: &[u8] = b"56";
    pub const TRANSACT_TIME: &[u8] = b"60";
    pub const ENCRYPT_METHOD: &[u8] = b"98";
    pub const HEART_BT_INT: &[u8] = b"108";
    pub const EXEC_ID: &[u8] = b"17";
    pub const EXEC_TYPE: &[u8] = b"150";
    pub const LEAVES_QTY: &[u8] = b"151";
}

/// MsgType values used by the examples.
pub mod msg_type {
    pub const HEARTBEAT: &[u8] = b"0";
    pub const LOGOUT: &[u8] = b"5";
    pub const EXECUTION_REPORT: &[u8] = b"8";
    pub const LOGON: &[u8] = b"A";
    pub const NEW_ORDER_SINGLE: &[u8] = b"D";
}

/// Example configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
}

impl ExampleConfig {
    /// Configuration for the client side.
    #[must_use]
    pub fn client() -> Self {
        Self::from_env("CLIENT", "SERVER")
    }

    /// Configuration for the server side.
    #[must_use]
    pub fn server() -> Self {
        Self::from_env("SERVER", "CLIENT")
    }

    fn from_env(sender: &str, target: &str) -> Self {
        Self {
            host: env::var("FIX_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("FIX_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            sender_comp_id: env::var("FIX_SENDER").unwrap_or_else(|_| sender.to_string()),
            target_comp_id: env::var("FIX_TARGET").unwrap_or_else(|_| target.to_string()),
        }
    }

    /// Returns the socket address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Initializes logging for examples.
///
/// `RUST_LOG` refines the filter; `info` is always enabled.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// Current UTC time as a FIX `UTCTimestamp` with milliseconds.
#[must_use]
pub fn sending_time() -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format_timestamp(since_epoch)
}

/// Formats a time since the Unix epoch as `YYYYMMDD-HH:MM:SS.sss`.
#[must_use]
pub fn format_timestamp(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let tod = secs % 86_400;
    format!(
        "{year:04}{month:02}{day:02}-{:02}:{:02}:{:02}.{:03}",
        tod / 3600,
        (tod % 3600) / 60,
        tod % 60,
        since_epoch.subsec_millis()
    )
}

/// Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Standard header values for one outgoing message.
///
/// Holds the formatted sequence number and timestamp so a [`Message`] can
/// borrow them.
#[derive(Debug, Clone)]
pub struct StandardHeader {
    sender_comp_id: String,
    target_comp_id: String,
    msg_seq_num: String,
    sending_time: String,
}

impl StandardHeader {
    /// Header for message `seq` sent now.
    #[must_use]
    pub fn new(config: &ExampleConfig, seq: u64) -> Self {
        Self::at(config, seq, sending_time())
    }

    /// Header with an explicit sending time.
    #[must_use]
    pub fn at(config: &ExampleConfig, seq: u64, sending_time: String) -> Self {
        Self {
            sender_comp_id: config.sender_comp_id.clone(),
            target_comp_id: config.target_comp_id.clone(),
            msg_seq_num: seq.to_string(),
            sending_time,
        }
    }

    /// Sending time carried in tag 52.
    #[must_use]
    pub fn sending_time(&self) -> &str {
        &self.sending_time
    }

    /// Appends MsgType and the standard header fields to `message`.
    ///
    /// # Errors
    /// Returns `EncodeError::TooManyFields` if `message` is full.
    pub fn write<'a, const N: usize>(
        &'a self,
        msg_type: &'a [u8],
        message: &mut Message<'a, N>,
    ) -> Result<(), EncodeError> {
        message.push(tags::MSG_TYPE, msg_type)?;
        message.push(tags::SENDER_COMP_ID, self.sender_comp_id.as_bytes())?;
        message.push(tags::TARGET_COMP_ID, self.target_comp_id.as_bytes())?;
        message.push(tags::MSG_SEQ_NUM, self.msg_seq_num.as_bytes())?;
        message.push(tags::SENDING_TIME, self.sending_time.as_bytes())
    }
}

/// Builds a Logon with no encryption and the example heartbeat interval.
///
/// # Errors
/// Returns `EncodeError::TooManyFields` if `message` is full.
pub fn logon<'a, const N: usize>(
    header: &'a StandardHeader,
    message: &mut Message<'a, N>,
) -> Result<(), EncodeError> {
    header.write(msg_type::LOGON, message)?;
    message.push(tags::ENCRYPT_METHOD, b"0")?;
    message.push(tags::HEART_BT_INT, HEARTBEAT_INTERVAL)
}

/// Builds a Logout.
///
/// # Errors
/// Returns `EncodeError::TooManyFields` if `message` is full.
pub fn logout<'a, const N: usize>(
    header: &'a StandardHeader,
    message: &mut Message<'a, N>,
) -> Result<(), EncodeError> {
    header.write(msg_type::LOGOUT, message)
}

/// Order entry values borrowed by [`new_order_single`].
#[derive(Debug, Clone, Copy)]
pub struct Order<'a> {
    pub cl_ord_id: &'a [u8],
    pub symbol: &'a [u8],
    pub side: &'a [u8],
    pub quantity: &'a [u8],
    pub price: &'a [u8],
}

/// Builds a limit NewOrderSingle.
///
/// # Errors
/// Returns `EncodeError::TooManyFields` if `message` is full.
pub fn new_order_single<'a, const N: usize>(
    header: &'a StandardHeader,
    order: &Order<'a>,
    message: &mut Message<'a, N>,
) -> Result<(), EncodeError> {
    header.write(msg_type::NEW_ORDER_SINGLE, message)?;
    message.push(tags::CL_ORD_ID, order.cl_ord_id)?;
    message.push(tags::SYMBOL, order.symbol)?;
    message.push(tags::SIDE, order.side)?;
    message.push(tags::TRANSACT_TIME, header.sending_time().as_bytes())?;
    message.push(tags::ORDER_QTY, order.quantity)?;
    message.push(tags::ORD_TYPE, b"2")?;
    message.push(tags::PRICE, order.price)
}

/// Identifiers the server assigns when it acknowledges an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecIds {
    pub order_id: String,
    pub exec_id: String,
}

impl ExecIds {
    /// Derives the ids from the client order id.
    #[must_use]
    pub fn for_order(cl_ord_id: &[u8]) -> Self {
        let cl_ord_id = String::from_utf8_lossy(cl_ord_id);
        Self {
            order_id: format!("ORD{cl_ord_id}"),
            exec_id: format!("EX{cl_ord_id}"),
        }
    }
}

/// Builds an ExecutionReport acknowledging `order` as New.
///
/// Symbol, side, quantity and ClOrdID are borrowed from the received order.
///
/// # Errors
/// Returns `EncodeError::TooManyFields` if `report` is full.
pub fn execution_report<'a, const N: usize, const M: usize>(
    header: &'a StandardHeader,
    ids: &'a ExecIds,
    order: &Message<'a, M>,
    report: &mut Message<'a, N>,
) -> Result<(), EncodeError> {
    let value = |tag: &[u8]| order.get_value(tag).unwrap_or_default();

    header.write(msg_type::EXECUTION_REPORT, report)?;
    report.push(tags::ORDER_ID, ids.order_id.as_bytes())?;
    report.push(tags::CL_ORD_ID, value(tags::CL_ORD_ID))?;
    report.push(tags::EXEC_ID, ids.exec_id.as_bytes())?;
    report.push(tags::EXEC_TYPE, b"0")?;
    report.push(tags::ORD_STATUS, b"0")?;
    report.push(tags::SYMBOL, value(tags::SYMBOL))?;
    report.push(tags::SIDE, value(tags::SIDE))?;
    report.push(tags::LEAVES_QTY, value(tags::ORDER_QTY))?;
    report.push(tags::CUM_QTY, b"0")?;
    report.push(tags::AVG_PX, b"0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashfix::tagvalue::{deserialize, framed_len, serialize_framed};

    fn config() -> ExampleConfig {
        ExampleConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sender_comp_id: "CLIENT".to_string(),
            target_comp_id: "SERVER".to_string(),
        }
    }

    #[test]
    fn test_addr() {
        assert_eq!(config().addr(), "127.0.0.1:9876");
    }

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_017), (2000, 3, 1));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
    }

    #[test]
    fn test_format_timestamp() {
        let t = Duration::from_millis(19_723 * 86_400_000 + 13 * 3_600_000 + 5 * 60_000 + 7_042);
        assert_eq!(format_timestamp(t), "20240101-13:05:07.042");
        assert_eq!(sending_time().len(), 21);
    }

    #[test]
    fn test_header_fields_in_order() {
        let header = StandardHeader::at(&config(), 7, "20240101-00:00:00.000".to_string());
        let mut msg: Message<'_, 8> = Message::new();
        logout(&header, &mut msg).unwrap();

        let order: Vec<&[u8]> = msg.iter().map(|f| f.tag).collect();
        let expected: [&[u8]; 5] = [b"35", b"49", b"56", b"34", b"52"];
        assert_eq!(order, expected);
        assert_eq!(msg.get_value(tags::MSG_SEQ_NUM), Some(&b"7"[..]));
        assert_eq!(msg.get_value(tags::SENDER_COMP_ID), Some(&b"CLIENT"[..]));
    }

    #[test]
    fn test_header_reports_full_message() {
        let header = StandardHeader::at(&config(), 1, String::new());
        let mut msg: Message<'_, 3> = Message::new();
        assert!(matches!(
            header.write(msg_type::HEARTBEAT, &mut msg),
            Err(EncodeError::TooManyFields { .. })
        ));
    }

    #[test]
    fn test_order_roundtrip_to_report() {
        let client = config();
        let header = StandardHeader::new(&client, 2);
        let order = Order {
            cl_ord_id: b"42",
            symbol: b"MSFT",
            side: b"1",
            quantity: b"250",
            price: b"410.5",
        };
        let mut outgoing: Message<'_, 16> = Message::new();
        new_order_single(&header, &order, &mut outgoing).unwrap();

        let mut wire = vec![0u8; framed_len(&outgoing)];
        serialize_framed(&outgoing, &mut wire).unwrap();

        let mut received: Message<'_, 16> = Message::new();
        deserialize(&mut wire, &mut received).unwrap();
        assert_eq!(received.get_value(tags::PRICE), Some(&b"410.5"[..]));

        let server_header = StandardHeader::new(&client, 2);
        let ids = ExecIds::for_order(received.get_value(tags::CL_ORD_ID).unwrap());
        let mut report: Message<'_, 16> = Message::new();
        execution_report(&server_header, &ids, &received, &mut report).unwrap();

        assert_eq!(report.get_value(tags::MSG_TYPE), Some(msg_type::EXECUTION_REPORT));
        assert_eq!(report.get_value(tags::ORDER_ID), Some(&b"ORD42"[..]));
        assert_eq!(report.get_value(tags::SYMBOL), Some(&b"MSFT"[..]));
        assert_eq!(report.get_value(tags::LEAVES_QTY), Some(&b"250"[..]));
    }
}
