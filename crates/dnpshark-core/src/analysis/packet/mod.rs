pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{IpPacket, TransportKind, parse_ip_packet};
