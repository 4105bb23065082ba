//! Byte offsets and constants for the DNP3 link, transport and application
//! layers. Ranges index into the slice handed to the matching parser.

pub const START_BYTES: [u8; 2] = [0x05, 0x64];
pub const START_RANGE: std::ops::Range<usize> = 0..2;
pub const LENGTH_OFFSET: usize = 2;
pub const CONTROL_OFFSET: usize = 3;
pub const DESTINATION_RANGE: std::ops::Range<usize> = 4..6;
pub const SOURCE_RANGE: std::ops::Range<usize> = 6..8;
pub const HEADER_CRC_RANGE: std::ops::Range<usize> = 8..10;
pub const HEADER_LEN: usize = 10;

/// Control, destination and source octets counted by the length field.
pub const LENGTH_OVERHEAD: usize = 5;

pub const CHUNK_DATA_LEN: usize = 16;
pub const CHUNK_CRC_LEN: usize = 2;

pub const TRANSPORT_SEQUENCE_MASK: u8 = 0x3F;
pub const SEQUENCE_CYCLE: i64 = 64;
pub const SEQUENCE_WINDOW: i64 = 32;
/// Fragment cap per reassembled message.
pub const DEFAULT_MAX_SEGMENTS: usize = 60;

pub const APP_CONTROL_OFFSET: usize = 0;
pub const APP_FUNCTION_OFFSET: usize = 1;
pub const APP_IIN_RANGE: std::ops::Range<usize> = 2..4;
pub const APP_REQUEST_HEADER_LEN: usize = 2;
pub const APP_RESPONSE_HEADER_LEN: usize = 4;
pub const APP_SEQUENCE_MASK: u8 = 0x0F;

pub const OBJECT_TYPE_LEN: usize = 2;
pub const QUALIFIER_LEN: usize = 1;
pub const OBJECT_HEADER_LEN: usize = OBJECT_TYPE_LEN + QUALIFIER_LEN;

/// 48-bit millisecond timestamp.
pub const TIME_LEN: usize = 6;
pub const RELATIVE_TIME_LEN: usize = 2;
