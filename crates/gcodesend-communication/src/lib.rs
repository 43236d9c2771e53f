//! # GCodeSend Communication
//!
//! Serial link, firmware reply protocol, and the streaming engine that
//! delivers G-code to printer firmware: wake-up handshake, send with
//! acknowledgment and bounded resend, and the line-by-line driver.

pub mod communication;
pub mod protocol;
pub mod streaming;

pub use communication::{
    list_ports, open_serial, Channel, ConnectionParams, LineLink, Link, SerialLink, SerialParity,
    SerialPortInfo,
};
pub use protocol::Reply;
pub use streaming::{
    send_command, wait_for_ready, Acknowledgement, Delivery, StreamConfig, StreamDriver,
    StreamSummary,
};
