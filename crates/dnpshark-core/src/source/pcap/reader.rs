use std::io::{Read, Seek, SeekFrom};

use super::error::PcapSourceError;
use super::layout;
use pcap_parser::Linktype;

/// Read the magic bytes and rewind the reader to the start.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use dnpshark_core::source::pcap::reader::read_magic_and_rewind;
/// use std::io::Cursor;
///
/// let bytes = [0x0a, 0x0d, 0x0d, 0x0a, 0x01];
/// let mut cursor = Cursor::new(bytes);
/// let magic = read_magic_and_rewind(&mut cursor).unwrap();
/// assert_eq!(magic, [0x0a, 0x0d, 0x0d, 0x0a]);
/// ```
///
/// # Errors
/// Returns `PcapSourceError` when the reader cannot be read or rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

/// Check whether the magic bytes match PCAPNG.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use dnpshark_core::source::pcap::reader::is_pcapng_magic;
///
/// let magic = [0x0a, 0x0d, 0x0d, 0x0a];
/// assert!(is_pcapng_magic(&magic));
/// ```
pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Link type and timestamp resolution of one pcapng interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub linktype: Linktype,
    pub tsresol: u8,
}

/// Resolve the interface for an id, defaulting to Ethernet in microseconds.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use dnpshark_core::source::pcap::reader::{InterfaceInfo, interface_for_id};
/// use pcap_parser::Linktype;
///
/// let interfaces = [InterfaceInfo { linktype: Linktype::RAW, tsresol: 9 }];
/// assert_eq!(interface_for_id(&interfaces, 0).linktype, Linktype::RAW);
/// assert_eq!(interface_for_id(&interfaces, 1).linktype, Linktype::ETHERNET);
/// ```
pub fn interface_for_id(interfaces: &[InterfaceInfo], if_id: u32) -> InterfaceInfo {
    interfaces
        .get(if_id as usize)
        .copied()
        .unwrap_or(InterfaceInfo {
            linktype: Linktype::ETHERNET,
            tsresol: layout::DEFAULT_TSRESOL,
        })
}

/// Convert a PCAPNG high/low timestamp to seconds using `if_tsresol`.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use dnpshark_core::source::pcap::reader::pcapng_ts_to_seconds;
///
/// let seconds = pcapng_ts_to_seconds(0, 1_500_000, 6);
/// assert!((seconds - 1.5).abs() < f64::EPSILON);
/// ```
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32, tsresol: u8) -> f64 {
    let ticks = ((ts_high as u64) << 32) | (ts_low as u64);
    let exponent = i32::from(tsresol & !layout::TSRESOL_BINARY_FLAG);
    let ticks_per_second = if tsresol & layout::TSRESOL_BINARY_FLAG != 0 {
        2f64.powi(exponent)
    } else {
        10f64.powi(exponent)
    };
    ticks as f64 / ticks_per_second
}

/// Convert a legacy PCAP timestamp; the fraction is nanoseconds for
/// nanosecond-precision files.
pub fn legacy_ts_to_seconds(ts_sec: u32, ts_frac: u32, nanosecond: bool) -> f64 {
    let unit = if nanosecond { 1e-9 } else { 1e-6 };
    ts_sec as f64 + ts_frac as f64 * unit
}

#[cfg(test)]
mod tests {
    use super::{
        InterfaceInfo, interface_for_id, is_pcapng_magic, legacy_ts_to_seconds,
        pcapng_ts_to_seconds, read_magic_and_rewind,
    };
    use crate::source::pcap::error::PcapSourceError;
    use pcap_parser::Linktype;
    use std::io::Cursor;
    use std::io::Read;

    #[test]
    fn detect_pcapng_magic() {
        let data = super::layout::PCAPNG_MAGIC;
        assert!(is_pcapng_magic(&data));
    }

    #[test]
    fn read_magic_rewinds() {
        let bytes = [0x0a, 0x0d, 0x0d, 0x0a, 0x01];
        let mut cursor = Cursor::new(bytes);
        let magic = read_magic_and_rewind(&mut cursor).unwrap();
        assert_eq!(magic, [0x0a, 0x0d, 0x0d, 0x0a]);
        let mut buf = [0u8; 1];
        cursor.read_exact(&mut buf).unwrap();
        assert_eq!(buf[0], 0x0a);
    }

    #[test]
    fn read_magic_too_short() {
        let bytes = [0x0a, 0x0d, 0x0d];
        let mut cursor = Cursor::new(bytes);
        let err = read_magic_and_rewind(&mut cursor).unwrap_err();
        assert!(matches!(err, PcapSourceError::Io(_)));
    }

    #[test]
    fn interface_defaults_to_ethernet_when_missing() {
        let interfaces = [InterfaceInfo {
            linktype: Linktype::RAW,
            tsresol: 9,
        }];
        assert_eq!(interface_for_id(&interfaces, 0).linktype, Linktype::RAW);
        let fallback = interface_for_id(&interfaces, 1);
        assert_eq!(fallback.linktype, Linktype::ETHERNET);
        assert_eq!(fallback.tsresol, 6);
    }

    #[test]
    fn pcapng_ts_honors_resolution() {
        let micros = pcapng_ts_to_seconds(0, 1_500_000, 6);
        assert!((micros - 1.5).abs() < f64::EPSILON);
        let nanos = pcapng_ts_to_seconds(0, 1_500_000_000, 9);
        assert!((nanos - 1.5).abs() < 1e-9);
        let binary = pcapng_ts_to_seconds(0, 3, 0x81);
        assert!((binary - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn legacy_ts_precision() {
        assert!((legacy_ts_to_seconds(2, 500_000, false) - 2.5).abs() < 1e-9);
        assert!((legacy_ts_to_seconds(2, 500_000_000, true) - 2.5).abs() < 1e-9);
    }
}
