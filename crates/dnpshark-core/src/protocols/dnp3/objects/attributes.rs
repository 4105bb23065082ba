//! Group 0 device attributes: a type byte, a length byte and the value.

use serde::Serialize;

use super::super::error::Dnp3Error;
use super::super::reader::Dnp3Reader;
use super::values::HexBytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    None,
    VisibleString,
    UnsignedInt,
    SignedInt,
    Float,
    OctetString,
    BitString,
    Time,
    UnicodeString,
    List,
    ExtendedList,
    Unknown(u8),
}

impl AttributeType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => AttributeType::None,
            0x01 => AttributeType::VisibleString,
            0x02 => AttributeType::UnsignedInt,
            0x03 => AttributeType::SignedInt,
            0x04 => AttributeType::Float,
            0x05 => AttributeType::OctetString,
            0x06 => AttributeType::BitString,
            0x07 => AttributeType::Time,
            0x08 => AttributeType::UnicodeString,
            0xFE => AttributeType::List,
            0xFF => AttributeType::ExtendedList,
            other => AttributeType::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AttributeType::None => "NONE (Placeholder)",
            AttributeType::VisibleString => "VSTR (Visible ASCII String)",
            AttributeType::UnsignedInt => "UINT (Unsigned Integer)",
            AttributeType::SignedInt => "INT (Signed Integer)",
            AttributeType::Float => "FLT (Floating Point)",
            AttributeType::OctetString => "OSTR (Octet String)",
            AttributeType::BitString => "BSTR (Bit String)",
            AttributeType::Time => "TIME (DNP3 Time UINT48)",
            AttributeType::UnicodeString => "UNCD (Unicode String)",
            AttributeType::List => "U8BS8LIST (List of UINT8-BSTR8)",
            AttributeType::ExtendedList => "U8BS8EXLIST (Extended List of UINT8-BSTR8)",
            AttributeType::Unknown(_) => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    None,
    Text(String),
    Unsigned(u32),
    Signed(i32),
    Float(f64),
    /// Types that are recognized but not expanded, and values whose
    /// length does not match their type.
    Raw(HexBytes),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceAttribute {
    pub data_type: AttributeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u8>,
    pub value: AttributeValue,
}

/// Decode one attribute at `offset`. Returns the attribute and the number of
/// bytes consumed.
pub fn decode_attribute(
    reader: &Dnp3Reader<'_>,
    offset: usize,
) -> Result<(DeviceAttribute, usize), Dnp3Error> {
    let data_type = AttributeType::from_code(reader.read_u8(offset)?);
    if data_type == AttributeType::None {
        let attribute = DeviceAttribute {
            data_type,
            length: None,
            value: AttributeValue::None,
        };
        return Ok((attribute, 1));
    }

    let length = reader.read_u8(offset + 1)?;
    let value_offset = offset + 2;
    let width = usize::from(length);
    let value = match (data_type, length) {
        (AttributeType::VisibleString, _) => {
            let bytes = reader.read_slice(value_offset..value_offset + width)?;
            AttributeValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
        (AttributeType::UnsignedInt, 1 | 2 | 4) => {
            AttributeValue::Unsigned(reader.read_uint_le(value_offset, width)?)
        }
        (AttributeType::SignedInt, 1) => {
            AttributeValue::Signed(i32::from(reader.read_u8(value_offset)? as i8))
        }
        (AttributeType::SignedInt, 2) => {
            AttributeValue::Signed(i32::from(reader.read_i16_le(value_offset)?))
        }
        (AttributeType::SignedInt, 4) => AttributeValue::Signed(reader.read_i32_le(value_offset)?),
        (AttributeType::Float, 4) => {
            AttributeValue::Float(f64::from(reader.read_f32_le(value_offset)?))
        }
        (AttributeType::Float, 8) => AttributeValue::Float(reader.read_f64_le(value_offset)?),
        _ => AttributeValue::Raw(HexBytes::from(
            reader.read_slice(value_offset..value_offset + width)?,
        )),
    };

    let attribute = DeviceAttribute {
        data_type,
        length: Some(length),
        value,
    };
    Ok((attribute, 2 + width))
}

#[cfg(test)]
mod tests {
    use super::{AttributeType, AttributeValue, decode_attribute};
    use crate::protocols::dnp3::error::Dnp3Error;
    use crate::protocols::dnp3::reader::Dnp3Reader;

    #[test]
    fn unsigned_uses_declared_length() {
        let data = [0x02, 0x02, 0x34, 0x12, 0xFF];
        let (attribute, consumed) = decode_attribute(&Dnp3Reader::new(&data), 0).unwrap();
        assert_eq!(attribute.data_type, AttributeType::UnsignedInt);
        assert_eq!(attribute.value, AttributeValue::Unsigned(0x1234));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn visible_string() {
        let data = [0x01, 0x03, b'R', b'T', b'U'];
        let (attribute, consumed) = decode_attribute(&Dnp3Reader::new(&data), 0).unwrap();
        assert_eq!(attribute.value, AttributeValue::Text("RTU".to_string()));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn signed_and_float_values() {
        let data = [0x03, 0x01, 0xFE];
        let (attribute, _) = decode_attribute(&Dnp3Reader::new(&data), 0).unwrap();
        assert_eq!(attribute.value, AttributeValue::Signed(-2));

        let mut data = vec![0x04, 0x08];
        data.extend_from_slice(&2.5f64.to_le_bytes());
        let (attribute, consumed) = decode_attribute(&Dnp3Reader::new(&data), 0).unwrap();
        assert_eq!(attribute.value, AttributeValue::Float(2.5));
        assert_eq!(consumed, 10);
    }

    #[test]
    fn unexpanded_types_skip_their_length() {
        let data = [0x05, 0x02, 0xAB, 0xCD, 0x00];
        let (attribute, consumed) = decode_attribute(&Dnp3Reader::new(&data), 0).unwrap();
        assert_eq!(attribute.data_type, AttributeType::OctetString);
        assert!(matches!(attribute.value, AttributeValue::Raw(ref raw) if raw.len() == 2));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn none_type_has_no_length() {
        let (attribute, consumed) = decode_attribute(&Dnp3Reader::new(&[0x00]), 0).unwrap();
        assert_eq!(attribute.length, None);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn truncated_value_is_an_error() {
        let data = [0x01, 0x05, b'a'];
        let err = decode_attribute(&Dnp3Reader::new(&data), 0).unwrap_err();
        assert!(matches!(err, Dnp3Error::TooShort { .. }));
    }
}
