//! Transport header sizes used to locate application payloads.

pub const UDP_HEADER_LEN: usize = 8;
pub const TCP_MIN_HEADER_LEN: usize = 20;
/// Byte holding the TCP data offset (high nibble, in 32-bit words).
pub const TCP_DATA_OFFSET_BYTE: usize = 12;
pub const TCP_DATA_OFFSET_SHIFT: u8 = 4;
pub const TCP_WORD_LEN: usize = 4;
