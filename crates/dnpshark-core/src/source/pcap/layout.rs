//! PCAP/PCAPNG constants.

/// Section header block type, as read from the first four bytes.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];
pub const PCAP_READER_BUFFER_SIZE: usize = 65536;

/// `if_tsresol` default: microseconds.
pub const DEFAULT_TSRESOL: u8 = 6;
/// High bit of `if_tsresol`: remaining bits are a power of two.
pub const TSRESOL_BINARY_FLAG: u8 = 0x80;
