//! Capture file source over legacy PCAP and PCAPNG.
//!
//! The format is chosen from the file magic. Legacy files carry one link type
//! and timestamp precision in the global header; PCAPNG files describe them
//! per interface, and each new section restarts interface numbering.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
