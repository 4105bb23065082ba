//! Application-layer header and object list.

use bitflags::bitflags;
use serde::Serialize;

use super::annotation::{Annotation, AnnotationKind, Layer};
use super::error::Dnp3Error;
use super::layout;
use super::objects::{ObjectContext, ObjectRecord, parse_object};
use super::reader::Dnp3Reader;

bitflags! {
    /// Flag bits of the application control octet (sequence excluded).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct ApplicationControl: u8 {
        const FIR = 0x80;
        const FIN = 0x40;
        const CON = 0x20;
        const UNS = 0x10;
    }
}

bitflags! {
    /// Internal indications carried by responses. The first octet on the
    /// wire is the high byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct Iin: u16 {
        const BROADCAST = 0x0100;
        const CLASS_1_EVENTS = 0x0200;
        const CLASS_2_EVENTS = 0x0400;
        const CLASS_3_EVENTS = 0x0800;
        const NEED_TIME = 0x1000;
        const LOCAL_CONTROL = 0x2000;
        const DEVICE_TROUBLE = 0x4000;
        const DEVICE_RESTART = 0x8000;
        const NO_FUNC_CODE_SUPPORT = 0x0001;
        const OBJECT_UNKNOWN = 0x0002;
        const PARAMETER_ERROR = 0x0004;
        const EVENT_BUFFER_OVERFLOW = 0x0008;
        const ALREADY_EXECUTING = 0x0010;
        const CONFIG_CORRUPT = 0x0020;
        const RESERVED_1 = 0x0040;
        const RESERVED_2 = 0x0080;
    }
}

impl Iin {
    /// Flags that indicate a problem at the outstation.
    pub const ABNORMAL: Iin = Iin::DEVICE_TROUBLE
        .union(Iin::CONFIG_CORRUPT)
        .union(Iin::ALREADY_EXECUTING)
        .union(Iin::EVENT_BUFFER_OVERFLOW)
        .union(Iin::PARAMETER_ERROR)
        .union(Iin::OBJECT_UNKNOWN)
        .union(Iin::NO_FUNC_CODE_SUPPORT);

    pub fn flag_name(flag: Iin) -> &'static str {
        match flag.bits() {
            0x0100 => "Broadcast message Rx'd",
            0x0200 => "Class 1 Data Available",
            0x0400 => "Class 2 Data Available",
            0x0800 => "Class 3 Data Available",
            0x1000 => "Time Sync Required from Master",
            0x2000 => "Outputs in Local Mode",
            0x4000 => "Device Trouble",
            0x8000 => "Device Restart",
            0x0001 => "Function Code not implemented",
            0x0002 => "Requested Objects Unknown",
            0x0004 => "Parameters Invalid or Out of Range",
            0x0008 => "Event Buffer Overflow",
            0x0010 => "Operation Already Executing",
            0x0020 => "Device Configuration Corrupt",
            0x0040 | 0x0080 => "Reserved",
            _ => "Unknown",
        }
    }

    /// Name of the flag at point index `index` of object 80/1. Indices 0-7
    /// address the first octet, 8-15 the second.
    pub fn bit_name(index: u32) -> &'static str {
        let bits = match index {
            0..=7 => 0x0100u16 << index,
            8..=15 => 1u16 << (index - 8),
            _ => return "Unknown",
        };
        Self::flag_name(Iin::from_bits_retain(bits))
    }

    /// Display names of every flag set, first octet first.
    pub fn names(self) -> Vec<&'static str> {
        self.iter().map(Self::flag_name).collect()
    }
}

/// Application function code with its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionCode {
    pub code: u8,
    pub name: &'static str,
}

impl FunctionCode {
    pub const CONFIRM: u8 = 0x00;
    pub const READ: u8 = 0x01;
    pub const RESPONSE: u8 = 0x81;
    pub const UNSOLICITED_RESPONSE: u8 = 0x82;
    pub const AUTHENTICATION_RESPONSE: u8 = 0x83;

    pub fn from_code(code: u8) -> Self {
        let name = match code {
            0x00 => "Confirm",
            0x01 => "Read",
            0x02 => "Write",
            0x03 => "Select",
            0x04 => "Operate",
            0x05 => "Direct Operate",
            0x06 => "Direct Operate No Ack",
            0x07 => "Immediate Freeze",
            0x08 => "Immediate Freeze No Ack",
            0x09 => "Freeze and Clear",
            0x0A => "Freeze and Clear No ACK",
            0x0B => "Freeze With Time",
            0x0C => "Freeze With Time No ACK",
            0x0D => "Cold Restart",
            0x0E => "Warm Restart",
            0x0F => "Initialize Data",
            0x10 => "Initialize Application",
            0x11 => "Start Application",
            0x12 => "Stop Application",
            0x13 => "Save Configuration",
            0x14 => "Enable Spontaneous Messages",
            0x15 => "Disable Spontaneous Messages",
            0x16 => "Assign Classes",
            0x17 => "Delay Measurement",
            0x18 => "Record Current Time",
            0x19 => "Open File",
            0x1A => "Close File",
            0x1B => "Delete File",
            0x1C => "Get File Info",
            0x1D => "Authenticate File",
            0x1E => "Abort File",
            0x1F => "Activate Config",
            0x20 => "Authentication Request",
            0x21 => "Authentication Error",
            0x81 => "Response",
            0x82 => "Unsolicited Response",
            0x83 => "Authentication Response",
            _ => "Unknown",
        };
        Self { code, name }
    }

    /// Responses carry internal indications after the function code.
    pub fn is_response(self) -> bool {
        matches!(
            self.code,
            Self::RESPONSE | Self::UNSOLICITED_RESPONSE | Self::AUTHENTICATION_RESPONSE
        )
    }

    /// Requests whose object headers carry no point data.
    pub fn header_only(self) -> bool {
        matches!(self.code, Self::CONFIRM | Self::READ | 0x07..=0x0A)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicationHeader {
    pub control: ApplicationControl,
    pub sequence: u8,
    pub function: FunctionCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iin: Option<Iin>,
}

impl ApplicationHeader {
    /// Octets before the first object header.
    pub fn byte_len(&self) -> usize {
        if self.iin.is_some() {
            layout::APP_RESPONSE_HEADER_LEN
        } else {
            layout::APP_REQUEST_HEADER_LEN
        }
    }
}

/// One reassembled application message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationMessage {
    pub header: ApplicationHeader,
    pub objects: Vec<ObjectRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Offset at which object decoding stopped on a fatal error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_at: Option<usize>,
}

impl ApplicationMessage {
    /// Requested classes (60/1..60/4 map to 0..3) in a READ request.
    pub fn requested_classes(&self) -> Vec<u8> {
        if self.header.function.code != FunctionCode::READ {
            return Vec::new();
        }
        let mut classes: Vec<u8> = self
            .objects
            .iter()
            .filter(|object| object.group == 60 && (1..=4).contains(&object.variation))
            .map(|object| object.variation - 1)
            .collect();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}

pub fn parse_header(message: &[u8]) -> Result<ApplicationHeader, Dnp3Error> {
    let reader = Dnp3Reader::new(message);
    reader.require_len(layout::APP_REQUEST_HEADER_LEN)?;
    let control_byte = reader.read_u8(layout::APP_CONTROL_OFFSET)?;
    let function = FunctionCode::from_code(reader.read_u8(layout::APP_FUNCTION_OFFSET)?);
    let iin = if function.is_response() {
        Some(Iin::from_bits_retain(
            reader.read_u16_be(layout::APP_IIN_RANGE.start)?,
        ))
    } else {
        None
    };
    Ok(ApplicationHeader {
        control: ApplicationControl::from_bits_truncate(control_byte),
        sequence: control_byte & layout::APP_SEQUENCE_MASK,
        function,
        iin,
    })
}

/// Decode a complete application message.
///
/// Fails only when the header itself is incomplete; object-level problems
/// are returned as annotations.
pub fn parse_application(message: &[u8]) -> Result<ApplicationMessage, Dnp3Error> {
    let header = parse_header(message)?;
    let mut ctx = ObjectContext::new();

    if let Some(iin) = header.iin {
        let abnormal = iin & Iin::ABNORMAL;
        if !abnormal.is_empty() {
            ctx.annotations.push(Annotation::new(
                Layer::Application,
                layout::APP_IIN_RANGE.start,
                AnnotationKind::AbnormalInternalIndication,
                abnormal.names().join(", "),
            ));
        }
    }

    let header_only = header.function.header_only();
    let mut objects = Vec::new();
    let mut truncated_at = None;
    let mut offset = header.byte_len();
    while offset + layout::OBJECT_TYPE_LEN <= message.len() {
        let parsed = parse_object(message, offset, header_only, &mut ctx);
        objects.push(parsed.record);
        if parsed.halted {
            truncated_at = Some(offset);
            break;
        }
        if parsed.end <= offset {
            break;
        }
        offset = parsed.end;
    }

    Ok(ApplicationMessage {
        header,
        objects,
        annotations: ctx.annotations,
        truncated_at,
    })
}
