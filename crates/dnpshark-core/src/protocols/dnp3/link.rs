use bitflags::bitflags;
use serde::Serialize;

use super::crc;
use super::error::Dnp3Error;
use super::layout;
use super::reader::Dnp3Reader;

bitflags! {
    /// Flag bits of the link control octet (function code excluded).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct LinkControl: u8 {
        const DIR = 0x80;
        const PRM = 0x40;
        /// Frame count bit (primary) or reserved (secondary).
        const FCB = 0x20;
        /// Frame count valid (primary) or data flow control (secondary).
        const FCV = 0x10;
    }
}

const FUNCTION_MASK: u8 = 0x0F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkFunction {
    ResetLinkStates,
    ResetUserProcess,
    TestLinkStates,
    ConfirmedUserData,
    UnconfirmedUserData,
    RequestLinkStatus,
    Ack,
    Nack,
    LinkStatus,
    NotFunctioning,
    NotSupported,
    Unknown { primary: bool, code: u8 },
}

impl LinkFunction {
    pub fn from_control(primary: bool, code: u8) -> Self {
        match (primary, code) {
            (true, 0x00) => LinkFunction::ResetLinkStates,
            (true, 0x01) => LinkFunction::ResetUserProcess,
            (true, 0x02) => LinkFunction::TestLinkStates,
            (true, 0x03) => LinkFunction::ConfirmedUserData,
            (true, 0x04) => LinkFunction::UnconfirmedUserData,
            (true, 0x09) => LinkFunction::RequestLinkStatus,
            (false, 0x00) => LinkFunction::Ack,
            (false, 0x01) => LinkFunction::Nack,
            (false, 0x0B) => LinkFunction::LinkStatus,
            (false, 0x0E) => LinkFunction::NotFunctioning,
            (false, 0x0F) => LinkFunction::NotSupported,
            (primary, code) => LinkFunction::Unknown { primary, code },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LinkFunction::ResetLinkStates => "Reset of Remote Link",
            LinkFunction::ResetUserProcess => "Reset of User Process",
            LinkFunction::TestLinkStates => "Test Function For Link",
            LinkFunction::ConfirmedUserData => "User Data",
            LinkFunction::UnconfirmedUserData => "Unconfirmed User Data",
            LinkFunction::RequestLinkStatus => "Request Link Status",
            LinkFunction::Ack => "ACK",
            LinkFunction::Nack => "NACK",
            LinkFunction::LinkStatus => "Status of Link",
            LinkFunction::NotFunctioning => "Link Service Not Functioning",
            LinkFunction::NotSupported => "Link Service Not Used or Implemented",
            LinkFunction::Unknown { .. } => "Unknown function",
        }
    }

    /// Link-only functions never carry a transport segment.
    fn is_link_only(self) -> bool {
        matches!(
            self,
            LinkFunction::ResetLinkStates
                | LinkFunction::RequestLinkStatus
                | LinkFunction::Ack
                | LinkFunction::LinkStatus
        )
    }
}

/// Decoded 10-byte link header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkHeader {
    pub length: u8,
    pub control: LinkControl,
    pub function_code: u8,
    pub function: LinkFunction,
    pub destination: u16,
    pub source: u16,
    pub checksum: u16,
    pub checksum_valid: bool,
}

impl LinkHeader {
    pub fn control_byte(&self) -> u8 {
        self.control.bits() | self.function_code
    }

    pub fn is_primary(&self) -> bool {
        self.control.contains(LinkControl::PRM)
    }

    /// True for frames sent by the master.
    pub fn from_master(&self) -> bool {
        self.control.contains(LinkControl::DIR)
    }

    /// A declared length below the fixed overhead cannot describe a frame.
    pub fn length_valid(&self) -> bool {
        usize::from(self.length) >= layout::LENGTH_OVERHEAD
    }

    /// User data octets after the header, excluding chunk checksums.
    pub fn payload_len(&self) -> usize {
        usize::from(self.length).saturating_sub(layout::LENGTH_OVERHEAD)
    }

    /// Total on-wire size of the frame including every chunk checksum.
    pub fn frame_len(&self) -> usize {
        frame_len(self.length)
    }

    pub fn carries_user_data(&self) -> bool {
        self.payload_len() > 0 && !self.function.is_link_only()
    }
}

/// On-wire size of a frame whose length field is `length`.
///
/// # Examples
/// ```text
/// use dnpshark_core::protocols::dnp3::link::frame_len;
///
/// assert_eq!(frame_len(5), 10);
/// assert_eq!(frame_len(255), 292);
/// ```
pub fn frame_len(length: u8) -> usize {
    let payload = usize::from(length).saturating_sub(layout::LENGTH_OVERHEAD);
    let chunks = payload.div_ceil(layout::CHUNK_DATA_LEN);
    layout::HEADER_LEN + payload + chunks * layout::CHUNK_CRC_LEN
}

/// Parse the link header at the start of `data`.
///
/// Returns `Ok(None)` when the start bytes do not match. A checksum mismatch
/// is not an error: it is reported through `checksum_valid`.
pub fn parse_link_header(data: &[u8]) -> Result<Option<LinkHeader>, Dnp3Error> {
    let reader = Dnp3Reader::new(data);
    reader.require_len(layout::HEADER_LEN)?;

    if reader.read_slice(layout::START_RANGE)? != layout::START_BYTES {
        return Ok(None);
    }

    let length = reader.read_u8(layout::LENGTH_OFFSET)?;
    let control_byte = reader.read_u8(layout::CONTROL_OFFSET)?;
    let control = LinkControl::from_bits_truncate(control_byte);
    let function_code = control_byte & FUNCTION_MASK;
    let destination = reader.read_u16_le(layout::DESTINATION_RANGE.start)?;
    let source = reader.read_u16_le(layout::SOURCE_RANGE.start)?;
    let checksum = reader.read_u16_le(layout::HEADER_CRC_RANGE.start)?;
    let covered = reader.read_slice(0..layout::HEADER_CRC_RANGE.start)?;

    Ok(Some(LinkHeader {
        length,
        control,
        function_code,
        function: LinkFunction::from_control(control.contains(LinkControl::PRM), function_code),
        destination,
        source,
        checksum,
        checksum_valid: crc::matches(covered, checksum),
    }))
}

/// Heuristic check for a DNP3 frame start: markers plus a valid header CRC.
pub fn looks_like_frame(data: &[u8]) -> bool {
    matches!(
        parse_link_header(data),
        Ok(Some(header)) if header.checksum_valid && header.length_valid()
    )
}
