//! Application-layer object headers and their points.
//!
//! `parse_object` reads one object header (group, variation, qualifier and
//! range) followed by its points. Problems are recorded as annotations on
//! the shared [`ObjectContext`]; a fatal one halts the message.

pub mod attributes;
pub mod auth;
pub mod catalog;
pub mod file;
pub mod points;
pub mod qualifier;
pub mod values;

use serde::Serialize;
use tracing::trace;

use super::annotation::{Annotation, AnnotationKind, Layer};
use super::cto::CtoTracker;
use super::error::Dnp3Error;
use super::layout::{OBJECT_HEADER_LEN, TIME_LEN};
use super::reader::Dnp3Reader;
use catalog::{Layout, is_octet_group, lookup};
use points::{BitCursor, PointInput, decode_point};
use qualifier::{PrefixKind, Qualifier, RangeSpec, parse_range};
use values::{HexBytes, PointValue, Timestamp};

const UNKNOWN_OBJECT_NAME: &str = "Unknown Object\\Variation";
const UNKNOWN_ATTRIBUTE_NAME: &str = "Unknown Device Attribute";
const ATTRIBUTE_GROUP: u8 = 0;
const AUTH_GROUP: u8 = 120;

/// One object header and the points decoded under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectRecord {
    pub offset: usize,
    pub group: u8,
    /// Normalized variation (0 for octet string groups).
    pub variation: u8,
    /// Per-point length of octet string groups (their wire variation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub octet_length: Option<u8>,
    pub name: &'static str,
    pub qualifier: Qualifier,
    pub range: RangeSpec,
    pub count: u32,
    pub points: Vec<PointRecord>,
    /// Decoding of this object stopped early.
    pub malformed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRecord {
    pub index: u32,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Absent when only the header of the point was decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<PointValue>,
}

/// State shared by every object of one application message.
#[derive(Debug, Default)]
pub struct ObjectContext {
    pub cto: CtoTracker,
    pub annotations: Vec<Annotation>,
}

impl ObjectContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn note(&mut self, offset: usize, kind: AnnotationKind, message: impl Into<String>) {
        self.annotations
            .push(Annotation::new(Layer::Application, offset, kind, message));
    }

    fn fail(&mut self, offset: usize, err: &Dnp3Error) {
        self.note(offset, err.annotation_kind(), err.to_string());
    }
}

/// Result of parsing one object.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedObject {
    pub record: ObjectRecord,
    /// Offset of the next object header.
    pub end: usize,
    /// The rest of the message must not be decoded.
    pub halted: bool,
}

/// Parse the object header at `offset` of `message` and its points.
///
/// With `header_only` set (request functions that carry no data), points
/// are only walked when the qualifier has a prefix, and their values are
/// only decoded when that prefix is a size.
pub fn parse_object(
    message: &[u8],
    offset: usize,
    header_only: bool,
    ctx: &mut ObjectContext,
) -> ParsedObject {
    let reader = Dnp3Reader::new(message);
    let group = message.get(offset).copied().unwrap_or_default();
    let wire_variation = message.get(offset + 1).copied().unwrap_or_default();
    let (variation, octet_length) = if is_octet_group(group) {
        (0, Some(wire_variation))
    } else {
        (wire_variation, None)
    };
    let header_only = header_only && !forces_full_decode(group, variation);

    let def = lookup(group, variation);
    let layout = match def {
        Some(def) => Some(def.layout),
        None if group == ATTRIBUTE_GROUP => Some(Layout::DeviceAttribute),
        None => None,
    };
    let name = match def {
        Some(def) => def.name,
        None if group == ATTRIBUTE_GROUP => UNKNOWN_ATTRIBUTE_NAME,
        None => UNKNOWN_OBJECT_NAME,
    };
    if def.is_none() {
        ctx.note(
            offset,
            AnnotationKind::UnknownObjectOrVariation,
            format!("unknown object group {group} variation {wire_variation}"),
        );
    }

    let qualifier = Qualifier::from_byte(message.get(offset + 2).copied().unwrap_or_default());
    let mut record = ObjectRecord {
        offset,
        group,
        variation,
        octet_length,
        name,
        qualifier,
        range: RangeSpec::default(),
        count: 0,
        points: Vec::new(),
        malformed: false,
    };

    if let Err(err) = reader.require_len(offset + OBJECT_HEADER_LEN) {
        ctx.fail(offset, &err);
        record.malformed = true;
        return ParsedObject {
            record,
            end: message.len(),
            halted: true,
        };
    }
    if qualifier.is_reserved() {
        ctx.note(
            offset + 2,
            AnnotationKind::ReservedQualifierCode,
            format!("reserved qualifier code 0x{:02X}", qualifier.raw),
        );
    }

    let range_offset = offset + OBJECT_HEADER_LEN;
    record.range = match parse_range(&reader, range_offset, qualifier.range) {
        Ok(range) => range,
        Err(err) => {
            ctx.fail(range_offset, &err);
            record.malformed = true;
            return ParsedObject {
                record,
                end: message.len(),
                halted: true,
            };
        }
    };
    record.count = record.range.count;
    let mut pos = range_offset + record.range.len;

    let prefixed = qualifier.prefix != PrefixKind::None;
    if header_only && !prefixed {
        return ParsedObject {
            record,
            end: pos,
            halted: false,
        };
    }

    if record.count > 0 && layout == Some(Layout::Empty) {
        ctx.note(
            offset,
            AnnotationKind::UnexpectedNonzeroCountForEmptyObjectType,
            format!("{name} carries {} points but defines none", record.count),
        );
        // The range field keeps the wire value.
        record.count = 0;
        record.range.count = 0;
    }
    let count = record.count;

    let decode_values = !header_only || qualifier.prefix.is_size();
    let prefix_width = qualifier.prefix.width();
    let mut bits = BitCursor::new();
    let mut address = record.range.start;
    let mut halted = false;

    for i in 0..count {
        let point_offset = pos;
        let mut size = None;
        if prefix_width > 0 {
            match reader.read_uint_le(pos, prefix_width) {
                Ok(value) => match qualifier.prefix {
                    PrefixKind::Index(_) => address = value,
                    _ => size = Some(value),
                },
                Err(err) => {
                    ctx.fail(pos, &err);
                    record.malformed = true;
                    halted = true;
                    break;
                }
            }
            pos += prefix_width;
        }

        if !decode_values {
            record.points.push(PointRecord {
                index: address,
                offset: point_offset,
                size,
                value: None,
            });
            address = address.wrapping_add(1);
            continue;
        }

        let Some(layout) = layout else {
            // Unknown object: skip by size prefix, or swallow the rest.
            let len = size.map_or(reader.remaining(pos), |size| size as usize);
            let data = match reader.read_slice(pos..pos + len) {
                Ok(bytes) => HexBytes::from(bytes),
                Err(err) => {
                    ctx.fail(pos, &err);
                    record.malformed = true;
                    halted = true;
                    break;
                }
            };
            pos += len;
            record.points.push(PointRecord {
                index: address,
                offset: point_offset,
                size,
                value: Some(PointValue::Opaque { data }),
            });
            if size.is_none() {
                break;
            }
            address = address.wrapping_add(1);
            continue;
        };

        let input = PointInput {
            index: address,
            size,
            prefixed,
            last: i + 1 == count,
            octet_length: usize::from(octet_length.unwrap_or_default()),
        };
        match decode_point(&reader, pos, layout, &input, &mut bits, &mut ctx.cto) {
            Ok((value, used)) => {
                if let Some(size) = size.filter(|&size| used > size as usize) {
                    ctx.note(
                        point_offset,
                        AnnotationKind::InconsistentLength,
                        format!("{name} point {address} overruns its {size}-byte size prefix"),
                    );
                }
                pos += used;
                record.points.push(PointRecord {
                    index: address,
                    offset: point_offset,
                    size,
                    value: Some(value),
                });
                if used == 0 && prefix_width == 0 && !layout.is_packed() {
                    trace!(group, variation, "zero-length points, stopping after one");
                    break;
                }
            }
            Err(err) => {
                ctx.fail(pos, &err);
                record.malformed = true;
                halted = true;
                break;
            }
        }
        address = address.wrapping_add(1);
    }

    ParsedObject {
        record,
        end: pos,
        halted,
    }
}

/// Authentication objects that carry data even in header-only requests.
fn forces_full_decode(group: u8, variation: u8) -> bool {
    group == AUTH_GROUP && matches!(variation, 3 | 9)
}

/// Length of the variable tail of a size-prefixed object once `consumed`
/// fixed bytes are read. Zero without a size prefix, and clamped to zero when
/// the prefix is smaller than the fixed fields; `parse_object` reports that.
pub(crate) fn trailing_len(size: Option<u32>, consumed: usize) -> usize {
    size.map_or(0, |size| (size as usize).saturating_sub(consumed))
}

/// Sequential field reader over one point.
pub(crate) struct Cursor<'r, 'a> {
    reader: &'r Dnp3Reader<'a>,
    start: usize,
    pos: usize,
}

impl<'r, 'a> Cursor<'r, 'a> {
    pub(crate) fn new(reader: &'r Dnp3Reader<'a>, start: usize) -> Self {
        Self {
            reader,
            start,
            pos: start,
        }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.pos - self.start
    }

    pub(crate) fn u8(&mut self) -> Result<u8, Dnp3Error> {
        let value = self.reader.read_u8(self.pos)?;
        self.pos += 1;
        Ok(value)
    }

    pub(crate) fn u16(&mut self) -> Result<u16, Dnp3Error> {
        let value = self.reader.read_u16_le(self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    pub(crate) fn i16(&mut self) -> Result<i16, Dnp3Error> {
        let value = self.reader.read_i16_le(self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, Dnp3Error> {
        let value = self.reader.read_u32_le(self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub(crate) fn i32(&mut self) -> Result<i32, Dnp3Error> {
        let value = self.reader.read_i32_le(self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub(crate) fn f32(&mut self) -> Result<f32, Dnp3Error> {
        let value = self.reader.read_f32_le(self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub(crate) fn f64(&mut self) -> Result<f64, Dnp3Error> {
        let value = self.reader.read_f64_le(self.pos)?;
        self.pos += 8;
        Ok(value)
    }

    /// Unsigned field of 1, 2 or 4 bytes.
    pub(crate) fn uint(&mut self, width: usize) -> Result<u32, Dnp3Error> {
        let value = self.reader.read_uint_le(self.pos, width)?;
        self.pos += width;
        Ok(value)
    }

    pub(crate) fn u48(&mut self) -> Result<u64, Dnp3Error> {
        let value = self.reader.read_u48_le(self.pos)?;
        self.pos += TIME_LEN;
        Ok(value)
    }

    pub(crate) fn time(&mut self) -> Result<Timestamp, Dnp3Error> {
        self.u48().map(Timestamp::absolute)
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8], Dnp3Error> {
        let bytes = self.reader.read_slice(self.pos..self.pos + len)?;
        self.pos += len;
        Ok(bytes)
    }

    pub(crate) fn hex(&mut self, len: usize) -> Result<HexBytes, Dnp3Error> {
        self.bytes(len).map(HexBytes::from)
    }

    /// Everything up to the end of a size-prefixed point.
    pub(crate) fn rest(&mut self, size: Option<u32>) -> Result<HexBytes, Dnp3Error> {
        let len = trailing_len(size, self.consumed());
        self.hex(len)
    }
}

#[cfg(test)]
mod tests {
    use super::qualifier::RangeField;
    use super::values::{Numeric, PointValue};
    use super::{ObjectContext, parse_object, trailing_len};
    use crate::protocols::dnp3::annotation::AnnotationKind;
    use crate::protocols::dnp3::error::Dnp3Error;

    #[test]
    fn start_stop_analogs() {
        // g30v2, qualifier 0x00, start 3 stop 4.
        let message = [30, 2, 0x00, 3, 4, 0x01, 0x10, 0x00, 0x01, 0xFF, 0xFF];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert!(!parsed.halted);
        assert_eq!(parsed.end, message.len());
        let record = parsed.record;
        assert_eq!(record.count, 2);
        assert_eq!(record.points.len(), 2);
        assert_eq!(record.points[0].index, 3);
        assert_eq!(record.points[1].index, 4);
        assert_eq!(record.points[1].offset, 8);
        match &record.points[1].value {
            Some(PointValue::Analog { value, .. }) => assert_eq!(*value, Numeric::Signed(-1)),
            other => panic!("unexpected value {other:?}"),
        }
        assert!(ctx.annotations.is_empty());
    }

    #[test]
    fn class_read_has_no_points() {
        // g60v2 all objects, g60v1 all objects.
        let message = [60, 2, 0x06, 60, 1, 0x06];
        let mut ctx = ObjectContext::new();
        let first = parse_object(&message, 0, true, &mut ctx);
        assert_eq!(first.end, 3);
        assert_eq!(first.record.name, "Class 1 Data");
        let second = parse_object(&message, first.end, true, &mut ctx);
        assert_eq!(second.end, 6);
        assert!(second.record.points.is_empty());
    }

    #[test]
    fn index_prefixed_points_take_their_address() {
        // g32v1 event, qualifier 0x17: u8 count, u8 index prefix.
        let mut message = vec![32, 1, 0x17, 1, 9, 0x01];
        message.extend_from_slice(&100i32.to_le_bytes());
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert_eq!(parsed.end, message.len());
        assert_eq!(parsed.record.points[0].index, 9);
    }

    #[test]
    fn header_only_prefixed_points_keep_indices() {
        // Read of g1v2 indices 5 and 6 via u8 index prefix.
        let message = [1, 2, 0x17, 2, 5, 6];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, true, &mut ctx);
        assert_eq!(parsed.end, message.len());
        let indices: Vec<u32> = parsed.record.points.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![5, 6]);
        assert!(parsed.record.points.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn nonzero_count_on_empty_object_is_flagged() {
        let message = [60, 1, 0x07, 3];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert_eq!(parsed.record.count, 0);
        assert_eq!(parsed.record.range.count, 0);
        assert_eq!(parsed.record.range.field, RangeField::Quantity { quantity: 3 });
        assert_eq!(parsed.end, message.len());
        assert!(!parsed.halted);
        assert!(parsed.record.points.is_empty());
        assert_eq!(
            ctx.annotations[0].kind,
            AnnotationKind::UnexpectedNonzeroCountForEmptyObjectType
        );
    }

    #[test]
    fn unknown_object_without_size_swallows_the_rest() {
        let message = [99, 7, 0x07, 1, 0xAA, 0xBB];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert_eq!(parsed.end, message.len());
        assert!(!parsed.halted);
        assert_eq!(
            ctx.annotations[0].kind,
            AnnotationKind::UnknownObjectOrVariation
        );
        assert_eq!(parsed.record.points.len(), 1);
    }

    #[test]
    fn reversed_range_halts_the_message() {
        let message = [1, 2, 0x00, 5, 2];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert!(parsed.halted);
        assert!(parsed.record.malformed);
        assert_eq!(
            ctx.annotations[0].kind,
            AnnotationKind::NegativeOrInvalidItemCount
        );
    }

    #[test]
    fn truncated_point_marks_record_malformed() {
        let message = [30, 1, 0x00, 0, 1, 0x01, 0x00, 0x00];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert!(parsed.halted);
        assert!(parsed.record.malformed);
        assert_eq!(ctx.annotations[0].kind, AnnotationKind::InconsistentLength);
    }

    #[test]
    fn octet_strings_use_wire_variation_as_length() {
        let message = [110, 3, 0x00, 0, 0, b'a', b'b', b'c'];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert_eq!(parsed.record.variation, 0);
        assert_eq!(parsed.record.octet_length, Some(3));
        assert_eq!(parsed.end, message.len());
    }

    #[test]
    fn zero_length_octet_strings_stop_after_one_point() {
        let message = [110, 0, 0x01, 0x00, 0x00, 0xFF, 0xFF];
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert_eq!(parsed.record.count, 0x1_0000);
        assert_eq!(parsed.record.points.len(), 1);
    }

    #[test]
    fn trailing_len_clamps_underflow() {
        assert_eq!(trailing_len(None, 10), 0);
        assert_eq!(trailing_len(Some(12), 10), 2);
        assert_eq!(trailing_len(Some(4), 10), 0);
    }

    #[test]
    fn undersized_file_prefix_is_flagged_and_clamped() {
        // g70v6 with a one-byte size prefix of 4; the fixed fields need 9.
        let mut message = vec![70, 6, 0x4B, 0x01, 0x04];
        message.extend_from_slice(&[1, 0, 0, 0, 2, 0, 0, 0x80, 0]);
        let mut ctx = ObjectContext::new();
        let parsed = parse_object(&message, 0, false, &mut ctx);
        assert!(!parsed.halted);
        assert_eq!(parsed.end, message.len());
        assert_eq!(parsed.record.points.len(), 1);
        assert_eq!(ctx.annotations.len(), 1);
        assert_eq!(ctx.annotations[0].kind, AnnotationKind::InconsistentLength);
        assert_eq!(ctx.annotations[0].offset, 4);
    }
}
