//! Packet sources feeding the analysis pipeline.
//!
//! Version française (résumé):
//! Les sources lisent les captures et produisent des paquets bruts avec
//! horodatage et type de lien. Aucune analyse DNP3 ici.

mod pcap;

pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured link-layer frame.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    /// Capture time in seconds since the Unix epoch, when known.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

/// Anything that yields captured packets in order.
pub trait PacketSource {
    /// Next packet, or `Ok(None)` once the input is exhausted.
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SourceError;
    use super::pcap::error::PcapSourceError;

    #[test]
    fn parse_errors_flatten_context() {
        let err = SourceError::from(PcapSourceError::pcap("pcap reader next", "bad record"));
        assert!(
            matches!(&err, SourceError::Pcap(message) if message == "pcap reader next: bad record")
        );
        assert_eq!(err.to_string(), "PCAP parse error: pcap reader next: bad record");
    }
}
