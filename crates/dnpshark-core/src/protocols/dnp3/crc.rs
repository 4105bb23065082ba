//! CRC-16/DNP as used by the link header and every data chunk.
//!
//! Reflected polynomial 0xA6BC (0x3D65 unreflected), zero seed, output
//! complemented. Stored little-endian on the wire.

const POLY_REFLECTED: u16 = 0xA6BC;

const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut idx = 0;
    while idx < 256 {
        let mut crc = idx as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLY_REFLECTED
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[idx] = crc;
        idx += 1;
    }
    table
}

/// Compute the DNP3 CRC over `data`.
///
/// # Examples
/// ```text
/// use dnpshark_core::protocols::dnp3::crc::crc16;
///
/// assert_eq!(crc16(b"123456789"), 0xEA82);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in data {
        crc = (crc >> 8) ^ TABLE[((crc ^ byte as u16) & 0x00FF) as usize];
    }
    !crc
}

/// Check `data` against a checksum read from the wire.
pub fn matches(data: &[u8], stored: u16) -> bool {
    crc16(data) == stored
}
