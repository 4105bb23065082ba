//! Per-layout point decoding.
//!
//! Each layout maps to a decode step that reads one point at an offset and
//! reports how many bytes it used. Packed bit layouts may use zero bytes:
//! the byte cursor only advances once a byte is exhausted or the object's
//! last point is read.

use super::super::application::Iin;
use super::super::cto::CtoTracker;
use super::super::error::Dnp3Error;
use super::super::reader::Dnp3Reader;
use super::attributes::decode_attribute;
use super::auth::{decode_auth, statistic_name};
use super::catalog::{Layout, TimeField, ValueKind};
use super::file::decode_file;
use super::values::{
    AnalogFlags, BinaryFlags, ControlBlock, ControlCode, ControlStatus, CounterFlags,
    DoubleBitState, HexBytes, Numeric, PointValue, Timestamp, binary_state,
};
use super::Cursor;

const COMMANDED_STATE_BIT: u8 = 0x80;
const MILLIS_PER_SECOND: u64 = 1_000;

/// Facts about the point being decoded that come from its object header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointInput {
    /// Point address (explicit index prefix or running address).
    pub index: u32,
    /// Size prefix, when the qualifier carries one.
    pub size: Option<u32>,
    /// True when every point carries a prefix.
    pub prefixed: bool,
    /// True for the last point of the object.
    pub last: bool,
    /// Per-point length of octet string objects.
    pub octet_length: usize,
}

/// Position inside the current byte of a packed bit object.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BitCursor {
    bit_index: u8,
}

impl BitCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the next `bits`-wide value (1 or 2 bits) from the byte at
    /// `offset`. Returns the value and the bytes consumed.
    ///
    /// Prefixed points take one byte each and read from bit 0.
    pub fn take(
        &mut self,
        reader: &Dnp3Reader<'_>,
        offset: usize,
        bits: u8,
        prefixed: bool,
        last: bool,
    ) -> Result<(u8, usize), Dnp3Error> {
        let byte = reader.read_u8(offset)?;
        let mask = (1u8 << bits) - 1;
        if prefixed {
            self.bit_index = 0;
            return Ok((byte & mask, 1));
        }
        let value = (byte >> (self.bit_index * bits)) & mask;
        self.bit_index += 1;
        if self.bit_index >= 8 / bits || last {
            self.bit_index = 0;
            return Ok((value, 1));
        }
        Ok((value, 0))
    }
}

/// Decode one point of `layout` at `offset`.
pub fn decode_point(
    reader: &Dnp3Reader<'_>,
    offset: usize,
    layout: Layout,
    input: &PointInput,
    bits: &mut BitCursor,
    cto: &mut CtoTracker,
) -> Result<(PointValue, usize), Dnp3Error> {
    let mut c = Cursor::new(reader, offset);
    let value = match layout {
        Layout::Empty => PointValue::Opaque {
            data: HexBytes::default(),
        },
        Layout::PackedBit | Layout::IinBit => {
            let (bit, used) = bits.take(reader, offset, 1, input.prefixed, input.last)?;
            let name = (layout == Layout::IinBit).then(|| Iin::bit_name(input.index));
            return Ok((
                PointValue::Bit {
                    value: bit != 0,
                    name,
                },
                used,
            ));
        }
        Layout::PackedDoubleBit => {
            let (pair, used) = bits.take(reader, offset, 2, input.prefixed, input.last)?;
            return Ok((
                PointValue::DoubleBit {
                    state: DoubleBitState::from_bits(pair),
                },
                used,
            ));
        }
        Layout::Binary { time, .. } => {
            let raw = c.u8()?;
            PointValue::Binary {
                state: binary_state(raw),
                flags: BinaryFlags::from_bits_retain(raw),
                time: read_time(&mut c, time, cto)?,
            }
        }
        Layout::DoubleBit { time } => {
            let raw = c.u8()?;
            PointValue::DoubleBitStatus {
                state: DoubleBitState::from_flags(raw),
                flags: BinaryFlags::from_bits_retain(raw),
                time: read_time(&mut c, time, cto)?,
            }
        }
        Layout::BinaryCommandEvent { time } => {
            let raw = c.u8()?;
            PointValue::BinaryCommandEvent {
                commanded_state: raw & COMMANDED_STATE_BIT != 0,
                status: ControlStatus::from_byte(raw),
                time: read_time(&mut c, absolute_if(time), cto)?,
            }
        }
        Layout::ControlBlock => PointValue::ControlBlock(ControlBlock {
            code: ControlCode::from_byte(c.u8()?),
            count: c.u8()?,
            on_time_ms: c.u32()?,
            off_time_ms: c.u32()?,
            status: ControlStatus::from_byte(c.u8()?),
        }),
        Layout::Counter { flags, kind, time } => {
            let flags = if flags {
                Some(CounterFlags::from_bits_retain(c.u8()?))
            } else {
                None
            };
            let value = c.uint(kind.width())?;
            PointValue::Counter {
                value,
                flags,
                time: read_time(&mut c, absolute_if(time), cto)?,
            }
        }
        Layout::Analog { flags, kind, time } => {
            let flags = if flags {
                Some(AnalogFlags::from_bits_retain(c.u8()?))
            } else {
                None
            };
            PointValue::Analog {
                value: read_numeric(&mut c, kind)?,
                flags,
                time: read_time(&mut c, absolute_if(time), cto)?,
            }
        }
        Layout::Deadband { kind } => PointValue::Deadband {
            value: read_numeric(&mut c, kind)?,
        },
        Layout::AnalogOutputStatus { kind, time } => {
            let flags = AnalogFlags::from_bits_retain(c.u8()?);
            PointValue::Analog {
                value: read_numeric(&mut c, kind)?,
                flags: Some(flags),
                time: read_time(&mut c, absolute_if(time), cto)?,
            }
        }
        Layout::AnalogOutputBlock { kind } => PointValue::AnalogOutputBlock {
            value: read_numeric(&mut c, kind)?,
            status: ControlStatus::from_byte(c.u8()?),
        },
        Layout::AnalogCommandEvent { kind, time } => {
            let status = ControlStatus::from_byte(c.u8()?);
            PointValue::AnalogCommandEvent {
                value: read_numeric(&mut c, kind)?,
                status,
                time: read_time(&mut c, absolute_if(time), cto)?,
            }
        }
        Layout::Time { sets_cto } => {
            let millis = c.u48()?;
            if sets_cto {
                cto.set(millis);
            }
            PointValue::Time {
                time: Timestamp::absolute(millis),
            }
        }
        Layout::TimeInterval => PointValue::TimeInterval {
            time: c.time()?,
            interval_ms: c.u32()?,
        },
        Layout::Delay { fine } => {
            let raw = u64::from(c.u16()?);
            PointValue::Delay {
                millis: if fine { raw } else { raw * MILLIS_PER_SECOND },
            }
        }
        Layout::OctetString => PointValue::OctetString {
            data: c.hex(input.octet_length)?,
        },
        Layout::DeviceAttribute => {
            let (attribute, used) = decode_attribute(reader, offset)?;
            return Ok((PointValue::Attribute(attribute), used));
        }
        Layout::File(kind) => {
            let (record, used) = decode_file(reader, offset, kind, input.size)?;
            return Ok((PointValue::File(record), used));
        }
        Layout::Auth(kind) => {
            let (record, used) = decode_auth(reader, offset, kind, input.size)?;
            return Ok((PointValue::Auth(record), used));
        }
        Layout::SecurityStatistic { time } => PointValue::SecurityStatistic {
            statistic: statistic_name(input.index),
            flags: CounterFlags::from_bits_retain(c.u8()?),
            association: c.u16()?,
            count: c.u32()?,
            time: read_time(&mut c, absolute_if(time), cto)?,
        },
        Layout::Opaque => match input.size {
            Some(size) => PointValue::Opaque {
                data: c.hex(size as usize)?,
            },
            None => PointValue::Opaque {
                data: c.hex(reader.remaining(offset))?,
            },
        },
    };
    Ok((value, c.consumed()))
}

fn absolute_if(time: bool) -> TimeField {
    if time {
        TimeField::Absolute
    } else {
        TimeField::None
    }
}

fn read_time(
    c: &mut Cursor<'_, '_>,
    field: TimeField,
    cto: &CtoTracker,
) -> Result<Option<Timestamp>, Dnp3Error> {
    match field {
        TimeField::None => Ok(None),
        TimeField::Absolute => c.time().map(Some),
        TimeField::Relative => {
            let offset_ms = c.u16()?;
            Ok(Some(Timestamp::Relative {
                offset_ms,
                resolved_ms: cto.resolve(offset_ms),
            }))
        }
    }
}

fn read_numeric(c: &mut Cursor<'_, '_>, kind: ValueKind) -> Result<Numeric, Dnp3Error> {
    let value = match kind {
        ValueKind::U16 => Numeric::Unsigned(u32::from(c.u16()?)),
        ValueKind::U32 => Numeric::Unsigned(c.u32()?),
        ValueKind::I16 => Numeric::Signed(i32::from(c.i16()?)),
        ValueKind::I32 => Numeric::Signed(c.i32()?),
        ValueKind::F32 => Numeric::Float(f64::from(c.f32()?)),
        ValueKind::F64 => Numeric::Float(c.f64()?),
    };
    Ok(value)
}
