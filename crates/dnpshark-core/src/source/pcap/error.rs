use thiserror::Error;

/// Failures while opening or walking a capture file.
#[derive(Debug, Error)]
pub enum PcapSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error ({context}): {message}")]
    Pcap {
        context: &'static str,
        message: String,
    },
}

impl PcapSourceError {
    /// Wrap a `pcap-parser` failure with the step that raised it.
    pub fn pcap(context: &'static str, err: impl std::fmt::Display) -> Self {
        PcapSourceError::Pcap {
            context,
            message: err.to_string(),
        }
    }
}
