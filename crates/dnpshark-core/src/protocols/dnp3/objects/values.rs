//! Decoded point payloads.

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::attributes::DeviceAttribute;
use super::auth::AuthRecord;
use super::file::FileRecord;

bitflags! {
    /// Quality flags of binary inputs and outputs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct BinaryFlags: u8 {
        const ONLINE = 0x01;
        const RESTART = 0x02;
        const COMM_LOST = 0x04;
        const REMOTE_FORCED = 0x08;
        const LOCAL_FORCED = 0x10;
        const CHATTER_FILTER = 0x20;
        const STATE = 0x80;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct CounterFlags: u8 {
        const ONLINE = 0x01;
        const RESTART = 0x02;
        const COMM_LOST = 0x04;
        const REMOTE_FORCED = 0x08;
        const LOCAL_FORCED = 0x10;
        const ROLLOVER = 0x20;
        const DISCONTINUITY = 0x40;
    }
}

bitflags! {
    /// Quality flags of analog inputs and outputs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct AnalogFlags: u8 {
        const ONLINE = 0x01;
        const RESTART = 0x02;
        const COMM_LOST = 0x04;
        const REMOTE_FORCED = 0x08;
        const LOCAL_FORCED = 0x10;
        const OVER_RANGE = 0x20;
        const REFERENCE_ERR = 0x40;
    }
}

const BINARY_STATE_BIT: u8 = 0x80;
const DOUBLE_BIT_SHIFT: u8 = 6;
const CONTROL_STATUS_MASK: u8 = 0x7F;
const CONTROL_OPERATION_MASK: u8 = 0x0F;
const CONTROL_QUEUE_CLEAR_MASK: u8 = 0x30;
const CONTROL_TRIP_CLOSE_MASK: u8 = 0xC0;

/// State bit carried in bit 7 of a binary flag byte.
pub fn binary_state(flags: u8) -> bool {
    flags & BINARY_STATE_BIT != 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleBitState {
    Intermediate,
    DeterminedOff,
    DeterminedOn,
    Indeterminate,
}

impl DoubleBitState {
    /// State from the two low bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => DoubleBitState::Intermediate,
            1 => DoubleBitState::DeterminedOff,
            2 => DoubleBitState::DeterminedOn,
            _ => DoubleBitState::Indeterminate,
        }
    }

    /// State held in bits 6-7 of a double-bit flag byte.
    pub fn from_flags(flags: u8) -> Self {
        Self::from_bits(flags >> DOUBLE_BIT_SHIFT)
    }
}

/// A numeric point value, widened to a common representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Numeric {
    Unsigned(u32),
    Signed(i32),
    Float(f64),
}

/// Absolute or CTO-relative time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timestamp {
    Absolute {
        millis: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        utc: Option<String>,
    },
    Relative {
        offset_ms: u16,
        /// Absolute time once resolved against the CTO.
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved_ms: Option<u64>,
    },
}

impl Timestamp {
    pub fn absolute(millis: u64) -> Self {
        Timestamp::Absolute {
            millis,
            utc: format_millis(millis),
        }
    }

    pub fn millis(&self) -> Option<u64> {
        match self {
            Timestamp::Absolute { millis, .. } => Some(*millis),
            Timestamp::Relative { resolved_ms, .. } => *resolved_ms,
        }
    }
}

/// RFC 3339 rendering of milliseconds since the Unix epoch.
pub fn format_millis(millis: u64) -> Option<String> {
    let nanos = i128::from(millis) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

/// Raw bytes rendered as a lowercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        HexBytes(bytes.to_vec())
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

/// Control code byte of a relay output or pattern control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlCode {
    pub raw: u8,
    pub operation: &'static str,
    pub queue_clear: &'static str,
    pub trip_close: &'static str,
}

impl ControlCode {
    pub fn from_byte(raw: u8) -> Self {
        let operation = match raw & CONTROL_OPERATION_MASK {
            0 => "NUL Operation",
            1 => "Pulse On",
            2 => "Pulse Off",
            3 => "Latch On",
            4 => "Latch Off",
            _ => "Unknown",
        };
        let queue_clear = match (raw & CONTROL_QUEUE_CLEAR_MASK) >> 4 {
            0 => "Not Set",
            1 => "Queue",
            2 => "Clear",
            _ => "Queue and Clear",
        };
        let trip_close = match (raw & CONTROL_TRIP_CLOSE_MASK) >> 6 {
            0 => "NUL",
            1 => "Close",
            2 => "Trip",
            _ => "Reserved",
        };
        Self {
            raw,
            operation,
            queue_clear,
            trip_close,
        }
    }
}

/// Status code echoed by control and command-event objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlStatus {
    pub code: u8,
    pub name: &'static str,
}

impl ControlStatus {
    /// Status from the low seven bits of `raw`.
    pub fn from_byte(raw: u8) -> Self {
        let code = raw & CONTROL_STATUS_MASK;
        let name = match code {
            0 => "Req. Accepted/Init/Queued",
            1 => "Req. Not Accepted; Arm-Timer Expired",
            2 => "Req. Not Accepted; No 'SELECT' Received",
            3 => "Req. Not Accepted; Format Err. in Ctl Req.",
            4 => "Ctl Oper. Not Supported For This Point",
            5 => "Req. Not Accepted; Ctrl Queue Full/Point Active",
            6 => "Req. Not Accepted; Ctrl Hardware Problems",
            7 => "Req. Not Accepted; Local/Remote switch in Local",
            8 => "Req. Not Accepted; Too many operations",
            9 => "Req. Not Accepted; Insufficient authorization",
            10 => "Req. Not Accepted; Local automation proc active",
            11 => "Req. Not Accepted; Processing limited",
            12 => "Req. Not Accepted; Out of range value",
            126 => "Req. Not Accepted; Non-participating (NOP request)",
            127 => "Req. Not Accepted; Undefined error",
            _ => "Unknown",
        };
        Self { code, name }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlBlock {
    pub code: ControlCode,
    pub count: u8,
    pub on_time_ms: u32,
    pub off_time_ms: u32,
    pub status: ControlStatus,
}

/// Payload of one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointValue {
    Bit {
        value: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'static str>,
    },
    DoubleBit {
        state: DoubleBitState,
    },
    Binary {
        state: bool,
        flags: BinaryFlags,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    DoubleBitStatus {
        state: DoubleBitState,
        flags: BinaryFlags,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    ControlBlock(ControlBlock),
    BinaryCommandEvent {
        commanded_state: bool,
        status: ControlStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    Counter {
        value: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<CounterFlags>,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    Analog {
        value: Numeric,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<AnalogFlags>,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    Deadband {
        value: Numeric,
    },
    AnalogOutputBlock {
        value: Numeric,
        status: ControlStatus,
    },
    AnalogCommandEvent {
        value: Numeric,
        status: ControlStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    Time {
        time: Timestamp,
    },
    TimeInterval {
        time: Timestamp,
        interval_ms: u32,
    },
    Delay {
        millis: u64,
    },
    OctetString {
        data: HexBytes,
    },
    Attribute(DeviceAttribute),
    File(FileRecord),
    Auth(AuthRecord),
    SecurityStatistic {
        statistic: &'static str,
        flags: CounterFlags,
        association: u16,
        count: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    Opaque {
        data: HexBytes,
    },
}

impl PointValue {
    /// Time carried by the point, if any.
    pub fn time(&self) -> Option<&Timestamp> {
        match self {
            PointValue::Binary { time, .. }
            | PointValue::DoubleBitStatus { time, .. }
            | PointValue::BinaryCommandEvent { time, .. }
            | PointValue::Counter { time, .. }
            | PointValue::Analog { time, .. }
            | PointValue::AnalogCommandEvent { time, .. }
            | PointValue::SecurityStatistic { time, .. } => time.as_ref(),
            PointValue::Time { time } | PointValue::TimeInterval { time, .. } => Some(time),
            _ => None,
        }
    }
}
