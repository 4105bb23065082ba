//! Object qualifier byte and the range field it selects.

use serde::Serialize;

use super::super::error::Dnp3Error;
use super::super::reader::Dnp3Reader;

const PREFIX_MASK: u8 = 0x70;
const PREFIX_SHIFT: u8 = 4;
const RANGE_MASK: u8 = 0x0F;

/// Per-point prefix selected by qualifier bits 4-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "width", rename_all = "snake_case")]
pub enum PrefixKind {
    None,
    /// Explicit point index of 1, 2 or 4 bytes.
    Index(usize),
    /// Explicit object size of 1, 2 or 4 bytes.
    Size(usize),
    Reserved(u8),
}

impl PrefixKind {
    fn from_code(code: u8) -> Self {
        match code {
            0 => PrefixKind::None,
            1 => PrefixKind::Index(1),
            2 => PrefixKind::Index(2),
            3 => PrefixKind::Index(4),
            4 => PrefixKind::Size(1),
            5 => PrefixKind::Size(2),
            6 => PrefixKind::Size(4),
            other => PrefixKind::Reserved(other),
        }
    }

    pub fn width(self) -> usize {
        match self {
            PrefixKind::Index(width) | PrefixKind::Size(width) => width,
            PrefixKind::None | PrefixKind::Reserved(_) => 0,
        }
    }

    pub fn is_size(self) -> bool {
        matches!(self, PrefixKind::Size(_))
    }

    pub fn name(self) -> &'static str {
        match self {
            PrefixKind::None => "None",
            PrefixKind::Index(1) => "1-Octet Index Prefix",
            PrefixKind::Index(2) => "2-Octet Index Prefix",
            PrefixKind::Index(_) => "4-Octet Index Prefix",
            PrefixKind::Size(1) => "1-Octet Object Size Prefix",
            PrefixKind::Size(2) => "2-Octet Object Size Prefix",
            PrefixKind::Size(_) => "4-Octet Object Size Prefix",
            PrefixKind::Reserved(_) => "Reserved",
        }
    }
}

/// Range field layout selected by qualifier bits 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "width", rename_all = "snake_case")]
pub enum RangeKind {
    StartStop(usize),
    Address(usize),
    NoRange,
    Quantity(usize),
    /// One-byte count of variable sized objects.
    FreeFormat,
    Reserved(u8),
}

impl RangeKind {
    fn from_code(code: u8) -> Self {
        match code {
            0 => RangeKind::StartStop(1),
            1 => RangeKind::StartStop(2),
            2 => RangeKind::StartStop(4),
            3 => RangeKind::Address(1),
            4 => RangeKind::Address(2),
            5 => RangeKind::Address(4),
            6 => RangeKind::NoRange,
            7 => RangeKind::Quantity(1),
            8 => RangeKind::Quantity(2),
            9 => RangeKind::Quantity(4),
            11 => RangeKind::FreeFormat,
            other => RangeKind::Reserved(other),
        }
    }

    /// Bytes occupied by the range field.
    pub fn field_len(self) -> usize {
        match self {
            RangeKind::StartStop(width) => width * 2,
            RangeKind::Address(width) | RangeKind::Quantity(width) => width,
            RangeKind::FreeFormat => 1,
            RangeKind::NoRange | RangeKind::Reserved(_) => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RangeKind::StartStop(1) => "8-bit Start and Stop Indices",
            RangeKind::StartStop(2) => "16-bit Start and Stop Indices",
            RangeKind::StartStop(_) => "32-bit Start and Stop Indices",
            RangeKind::Address(1) => "8-bit Single Field Address",
            RangeKind::Address(2) => "16-bit Single Field Address",
            RangeKind::Address(_) => "32-bit Single Field Address",
            RangeKind::NoRange => "No Range Field",
            RangeKind::Quantity(1) => "8-bit Single Field Quantity",
            RangeKind::Quantity(2) => "16-bit Single Field Quantity",
            RangeKind::Quantity(_) => "32-bit Single Field Quantity",
            RangeKind::FreeFormat => "Free-format Qualifier",
            RangeKind::Reserved(_) => "Reserved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Qualifier {
    pub raw: u8,
    pub prefix: PrefixKind,
    pub range: RangeKind,
}

impl Qualifier {
    pub fn from_byte(raw: u8) -> Self {
        Self {
            raw,
            prefix: PrefixKind::from_code((raw & PREFIX_MASK) >> PREFIX_SHIFT),
            range: RangeKind::from_code(raw & RANGE_MASK),
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self.prefix, PrefixKind::Reserved(_))
            || matches!(self.range, RangeKind::Reserved(_))
    }
}

/// Range field contents as read from the message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RangeField {
    StartStop { start: u32, stop: u32 },
    Address { address: u32 },
    Quantity { quantity: u32 },
    #[default]
    None,
}

/// Decoded range: item count and the first implicit point address.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeSpec {
    pub field: RangeField,
    pub count: u32,
    pub start: u32,
    /// Bytes consumed by the range field.
    #[serde(skip)]
    pub len: usize,
}

/// Read the range field starting at `offset`.
///
/// A stop index below the start index is `Dnp3Error::NegativeCount`.
pub fn parse_range(
    reader: &Dnp3Reader<'_>,
    offset: usize,
    kind: RangeKind,
) -> Result<RangeSpec, Dnp3Error> {
    let len = kind.field_len();
    let spec = match kind {
        RangeKind::StartStop(width) => {
            let start = reader.read_uint_le(offset, width)?;
            let stop = reader.read_uint_le(offset + width, width)?;
            if stop < start {
                return Err(Dnp3Error::NegativeCount { start, stop });
            }
            RangeSpec {
                field: RangeField::StartStop { start, stop },
                count: (stop - start).saturating_add(1),
                start,
                len,
            }
        }
        RangeKind::Address(width) => {
            let address = reader.read_uint_le(offset, width)?;
            RangeSpec {
                field: RangeField::Address { address },
                count: 1,
                start: address,
                len,
            }
        }
        RangeKind::Quantity(width) => {
            let quantity = reader.read_uint_le(offset, width)?;
            RangeSpec {
                field: RangeField::Quantity { quantity },
                count: quantity,
                start: 0,
                len,
            }
        }
        RangeKind::FreeFormat => {
            let quantity = u32::from(reader.read_u8(offset)?);
            RangeSpec {
                field: RangeField::Quantity { quantity },
                count: quantity,
                start: 0,
                len,
            }
        }
        RangeKind::NoRange | RangeKind::Reserved(_) => RangeSpec {
            field: RangeField::None,
            count: 0,
            start: 0,
            len: 0,
        },
    };
    Ok(spec)
}
