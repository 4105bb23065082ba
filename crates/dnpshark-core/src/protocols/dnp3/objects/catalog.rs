//! Object catalog: display name and payload layout per (group, variation).
//!
//! Entries are kept sorted by (group, variation) so lookups can binary
//! search. Octet string groups are stored under variation 0 because their
//! wire variation is a byte length.

use serde::Serialize;

/// Timestamp carried after the value of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    None,
    /// 48-bit milliseconds since the epoch.
    Absolute,
    /// 16-bit millisecond offset from the common time of occurrence.
    Relative,
}

impl TimeField {
    pub fn byte_len(self) -> usize {
        match self {
            TimeField::None => 0,
            TimeField::Absolute => super::super::layout::TIME_LEN,
            TimeField::Relative => super::super::layout::RELATIVE_TIME_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagFamily {
    BinaryInput,
    BinaryOutput,
}

/// Encoding of a numeric point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    U16,
    U32,
    I16,
    I32,
    F32,
    F64,
}

impl ValueKind {
    pub fn width(self) -> usize {
        match self {
            ValueKind::U16 | ValueKind::I16 => 2,
            ValueKind::U32 | ValueKind::I32 | ValueKind::F32 => 4,
            ValueKind::F64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileLayout {
    Command,
    CommandStatus,
    Transport,
    TransportStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthLayout {
    Challenge,
    Reply,
    AggressiveModeRequest,
    SessionKeyStatusRequest,
    SessionKeyStatus,
    SessionKeyChange,
    Error,
    Mac,
    UpdateKeyChangeRequest,
    UpdateKeyChangeReply,
    UpdateKeyChange,
    UpdateKeyChangeConfirmation,
}

/// Payload shape of one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Layout {
    /// Default variations and class objects: no points expected.
    Empty,
    PackedBit,
    PackedDoubleBit,
    IinBit,
    Binary { family: FlagFamily, time: TimeField },
    DoubleBit { time: TimeField },
    BinaryCommandEvent { time: bool },
    ControlBlock,
    Counter { flags: bool, kind: ValueKind, time: bool },
    Analog { flags: bool, kind: ValueKind, time: bool },
    Deadband { kind: ValueKind },
    AnalogOutputStatus { kind: ValueKind, time: bool },
    AnalogOutputBlock { kind: ValueKind },
    AnalogCommandEvent { kind: ValueKind, time: bool },
    Time { sets_cto: bool },
    TimeInterval,
    Delay { fine: bool },
    File(FileLayout),
    OctetString,
    DeviceAttribute,
    Auth(AuthLayout),
    SecurityStatistic { time: bool },
    /// Named but kept as raw bytes, bounded by the size prefix when present.
    Opaque,
}

impl Layout {
    /// Packed layouts share bytes between points.
    pub fn is_packed(self) -> bool {
        matches!(self, Layout::PackedBit | Layout::PackedDoubleBit | Layout::IinBit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectDef {
    pub group: u8,
    pub variation: u8,
    pub name: &'static str,
    #[serde(skip)]
    pub layout: Layout,
}

const fn entry(group: u8, variation: u8, name: &'static str, layout: Layout) -> ObjectDef {
    ObjectDef {
        group,
        variation,
        name,
        layout,
    }
}

/// Groups whose wire variation is the per-point byte length.
pub fn is_octet_group(group: u8) -> bool {
    matches!(group, 110 | 111)
}

/// Catalog entry for a normalized (group, variation) pair.
pub fn lookup(group: u8, variation: u8) -> Option<&'static ObjectDef> {
    CATALOG
        .binary_search_by_key(&(group, variation), |def| (def.group, def.variation))
        .ok()
        .map(|index| &CATALOG[index])
}

#[rustfmt::skip]
pub static CATALOG: &[ObjectDef] = &[
    entry(0, 196, "Device Attributes - Configuration ID", Layout::DeviceAttribute),
    entry(0, 197, "Device Attributes - Configuration version", Layout::DeviceAttribute),
    entry(0, 198, "Device Attributes - Configuration build date", Layout::DeviceAttribute),
    entry(0, 199, "Device Attributes - Configuration last change date", Layout::DeviceAttribute),
    entry(0, 200, "Device Attributes - Configuration signature", Layout::DeviceAttribute),
    entry(0, 201, "Device Attributes - Configuration signature algorithm", Layout::DeviceAttribute),
    entry(0, 202, "Device Attributes - Master Resource ID (mRID)", Layout::DeviceAttribute),
    entry(0, 203, "Device Attributes - Device altitude", Layout::DeviceAttribute),
    entry(0, 204, "Device Attributes - Device longitude", Layout::DeviceAttribute),
    entry(0, 205, "Device Attributes - Device latitude", Layout::DeviceAttribute),
    entry(0, 206, "Device Attributes - User-assigned secondary operator name", Layout::DeviceAttribute),
    entry(0, 207, "Device Attributes - User-assigned primary operator name", Layout::DeviceAttribute),
    entry(0, 208, "Device Attributes - User-assigned system name", Layout::DeviceAttribute),
    entry(0, 209, "Device Attributes - Secure authentication version", Layout::DeviceAttribute),
    entry(0, 210, "Device Attributes - Number of security statistics per association", Layout::DeviceAttribute),
    entry(0, 211, "Device Attributes - Identifier of support for user-specific attributes", Layout::DeviceAttribute),
    entry(0, 212, "Device Attributes - Number of master-defined data set prototypes", Layout::DeviceAttribute),
    entry(0, 213, "Device Attributes - Number of outstation-defined data set prototypes", Layout::DeviceAttribute),
    entry(0, 214, "Device Attributes - Number of master-defined data sets", Layout::DeviceAttribute),
    entry(0, 215, "Device Attributes - Number of outstation-defined data sets", Layout::DeviceAttribute),
    entry(0, 216, "Device Attributes - Max number of binary outputs per request", Layout::DeviceAttribute),
    entry(0, 217, "Device Attributes - Local timing accuracy", Layout::DeviceAttribute),
    entry(0, 218, "Device Attributes - Duration of timing accuracy", Layout::DeviceAttribute),
    entry(0, 219, "Device Attributes - Support for analog output events", Layout::DeviceAttribute),
    entry(0, 220, "Device Attributes - Max analog output index", Layout::DeviceAttribute),
    entry(0, 221, "Device Attributes - Number of analog outputs", Layout::DeviceAttribute),
    entry(0, 222, "Device Attributes - Support for binary output events", Layout::DeviceAttribute),
    entry(0, 223, "Device Attributes - Max binary output index", Layout::DeviceAttribute),
    entry(0, 224, "Device Attributes - Number of binary outputs", Layout::DeviceAttribute),
    entry(0, 225, "Device Attributes - Support for frozen counter events", Layout::DeviceAttribute),
    entry(0, 226, "Device Attributes - Support for frozen counters", Layout::DeviceAttribute),
    entry(0, 227, "Device Attributes - Support for counter events", Layout::DeviceAttribute),
    entry(0, 228, "Device Attributes - Max counter index", Layout::DeviceAttribute),
    entry(0, 229, "Device Attributes - Number of counter points", Layout::DeviceAttribute),
    entry(0, 230, "Device Attributes - Support for frozen analog inputs", Layout::DeviceAttribute),
    entry(0, 231, "Device Attributes - Support for analog input events", Layout::DeviceAttribute),
    entry(0, 232, "Device Attributes - Maximum analog input index", Layout::DeviceAttribute),
    entry(0, 233, "Device Attributes - Number of analog input points", Layout::DeviceAttribute),
    entry(0, 234, "Device Attributes - Support for Double-Bit BI Events", Layout::DeviceAttribute),
    entry(0, 235, "Device Attributes - Max Double-bit BI Point Index", Layout::DeviceAttribute),
    entry(0, 236, "Device Attributes - Number of Double-bit BI Points", Layout::DeviceAttribute),
    entry(0, 237, "Device Attributes - Support for Binary Input Events", Layout::DeviceAttribute),
    entry(0, 238, "Device Attributes - Max Binary Input Point Index", Layout::DeviceAttribute),
    entry(0, 239, "Device Attributes - Number of Binary Input Points", Layout::DeviceAttribute),
    entry(0, 240, "Device Attributes - Maximum Transmit Fragment Size", Layout::DeviceAttribute),
    entry(0, 241, "Device Attributes - Maximum Receive Fragment Size", Layout::DeviceAttribute),
    entry(0, 242, "Device Attributes - Device Manufacturers SW Version", Layout::DeviceAttribute),
    entry(0, 243, "Device Attributes - Device Manufacturers HW Version", Layout::DeviceAttribute),
    entry(0, 244, "Device Attributes - User-assigned owner name", Layout::DeviceAttribute),
    entry(0, 245, "Device Attributes - User-Assigned Location", Layout::DeviceAttribute),
    entry(0, 246, "Device Attributes - User-Assigned ID code/number", Layout::DeviceAttribute),
    entry(0, 247, "Device Attributes - User-Assigned Device Name", Layout::DeviceAttribute),
    entry(0, 248, "Device Attributes - Device Serial Number", Layout::DeviceAttribute),
    entry(0, 249, "Device Attributes - DNP Subset and Conformance", Layout::DeviceAttribute),
    entry(0, 250, "Device Attributes - Device Product Name and Model", Layout::DeviceAttribute),
    entry(0, 252, "Device Attributes - Device Manufacturers Name", Layout::DeviceAttribute),
    entry(0, 254, "Device Attributes - Non-specific All-attributes Request", Layout::DeviceAttribute),
    entry(0, 255, "Device Attributes - List of Attribute Variations", Layout::DeviceAttribute),
    entry(1, 0, "Binary Input Default Variation", Layout::Empty),
    entry(1, 1, "Single-Bit Binary Input", Layout::PackedBit),
    entry(1, 2, "Binary Input With Status", Layout::Binary { family: FlagFamily::BinaryInput, time: TimeField::None }),
    entry(2, 0, "Binary Input Change Default Variation", Layout::Empty),
    entry(2, 1, "Binary Input Change Without Time", Layout::Binary { family: FlagFamily::BinaryInput, time: TimeField::None }),
    entry(2, 2, "Binary Input Change With Time", Layout::Binary { family: FlagFamily::BinaryInput, time: TimeField::Absolute }),
    entry(2, 3, "Binary Input Change With Relative Time", Layout::Binary { family: FlagFamily::BinaryInput, time: TimeField::Relative }),
    entry(3, 0, "Double-bit Input Default Variation", Layout::Empty),
    entry(3, 1, "Double-bit Input No Flags", Layout::PackedDoubleBit),
    entry(3, 2, "Double-bit Input With Status", Layout::DoubleBit { time: TimeField::None }),
    entry(4, 0, "Double-bit Input Change Default Variation", Layout::Empty),
    entry(4, 1, "Double-bit Input Change Without Time", Layout::DoubleBit { time: TimeField::None }),
    entry(4, 2, "Double-bit Input Change With Time", Layout::DoubleBit { time: TimeField::Absolute }),
    entry(4, 3, "Double-bit Input Change With Relative Time", Layout::DoubleBit { time: TimeField::Relative }),
    entry(10, 0, "Binary Output Default Variation", Layout::Empty),
    entry(10, 1, "Binary Output", Layout::PackedBit),
    entry(10, 2, "Binary Output Status", Layout::Binary { family: FlagFamily::BinaryOutput, time: TimeField::None }),
    entry(11, 0, "Binary Output Change Default Variation", Layout::Empty),
    entry(11, 1, "Binary Output Change Without Time", Layout::Binary { family: FlagFamily::BinaryOutput, time: TimeField::None }),
    entry(11, 2, "Binary Output Change With Time", Layout::Binary { family: FlagFamily::BinaryOutput, time: TimeField::Absolute }),
    entry(12, 1, "Control Relay Output Block", Layout::ControlBlock),
    entry(12, 2, "Pattern Control Block", Layout::ControlBlock),
    entry(12, 3, "Pattern Mask", Layout::PackedBit),
    entry(13, 1, "Binary Command Event Without Time", Layout::BinaryCommandEvent { time: false }),
    entry(13, 2, "Binary Command Event With Time", Layout::BinaryCommandEvent { time: true }),
    entry(20, 0, "Binary Counter Default Variation", Layout::Empty),
    entry(20, 1, "32-Bit Binary Counter", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(20, 2, "16-Bit Binary Counter", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(20, 3, "32-Bit Binary Delta Counter", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(20, 4, "16-Bit Binary Delta Counter", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(20, 5, "32-Bit Binary Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U32, time: false }),
    entry(20, 6, "16-Bit Binary Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U16, time: false }),
    entry(20, 7, "32-Bit Binary Delta Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U32, time: false }),
    entry(20, 8, "16-Bit Binary Delta Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U16, time: false }),
    entry(21, 0, "Frozen Binary Counter Default Variation", Layout::Empty),
    entry(21, 1, "32-Bit Frozen Binary Counter", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(21, 2, "16-Bit Frozen Binary Counter", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(21, 3, "32-Bit Frozen Binary Delta Counter", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(21, 4, "16-Bit Frozen Binary Delta Counter", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(21, 5, "32-Bit Frozen Binary Counter With Flag and Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: true }),
    entry(21, 6, "16-Bit Frozen Binary Counter With Flag and Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: true }),
    entry(21, 7, "32-Bit Frozen Binary Delta Counter With Flag and Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: true }),
    entry(21, 8, "16-Bit Frozen Binary Delta Counter With Flag and Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: true }),
    entry(21, 9, "32-Bit Frozen Binary Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U32, time: false }),
    entry(21, 10, "16-Bit Frozen Binary Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U16, time: false }),
    entry(21, 11, "32-Bit Frozen Binary Delta Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U32, time: false }),
    entry(21, 12, "16-Bit Frozen Binary Delta Counter Without Flag", Layout::Counter { flags: false, kind: ValueKind::U16, time: false }),
    entry(22, 0, "Binary Counter Change Default Variation", Layout::Empty),
    entry(22, 1, "32-Bit Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(22, 2, "16-Bit Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(22, 3, "32-Bit Delta Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(22, 4, "16-Bit Delta Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(22, 5, "32-Bit Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: true }),
    entry(22, 6, "16-Bit Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: true }),
    entry(22, 7, "32-Bit Delta Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: true }),
    entry(22, 8, "16-Bit Delta Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: true }),
    entry(23, 0, "Frozen Binary Counter Change Default Variation", Layout::Empty),
    entry(23, 1, "32-Bit Frozen Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(23, 2, "16-Bit Frozen Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(23, 3, "32-Bit Frozen Delta Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: false }),
    entry(23, 4, "16-Bit Frozen Delta Counter Change Event w/o Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: false }),
    entry(23, 5, "32-Bit Frozen Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: true }),
    entry(23, 6, "16-Bit Frozen Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: true }),
    entry(23, 7, "32-Bit Frozen Delta Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U32, time: true }),
    entry(23, 8, "16-Bit Frozen Delta Counter Change Event with Time", Layout::Counter { flags: true, kind: ValueKind::U16, time: true }),
    entry(30, 0, "Analog Input Default Variation", Layout::Empty),
    entry(30, 1, "32-Bit Analog Input", Layout::Analog { flags: true, kind: ValueKind::I32, time: false }),
    entry(30, 2, "16-Bit Analog Input", Layout::Analog { flags: true, kind: ValueKind::I16, time: false }),
    entry(30, 3, "32-Bit Analog Input Without Flag", Layout::Analog { flags: false, kind: ValueKind::I32, time: false }),
    entry(30, 4, "16-Bit Analog Input Without Flag", Layout::Analog { flags: false, kind: ValueKind::I16, time: false }),
    entry(30, 5, "32-Bit Floating Point Input", Layout::Analog { flags: true, kind: ValueKind::F32, time: false }),
    entry(30, 6, "64-Bit Floating Point Input", Layout::Analog { flags: true, kind: ValueKind::F64, time: false }),
    entry(31, 1, "32-Bit Frozen Analog Input", Layout::Analog { flags: true, kind: ValueKind::I32, time: false }),
    entry(31, 2, "16-Bit Frozen Analog Input", Layout::Analog { flags: true, kind: ValueKind::I16, time: false }),
    entry(31, 3, "32-Bit Frozen Analog Input w/ Time of Freeze", Layout::Analog { flags: true, kind: ValueKind::I32, time: true }),
    entry(31, 4, "16-Bit Frozen Analog Input w/ Time of Freeze", Layout::Analog { flags: true, kind: ValueKind::I16, time: true }),
    entry(31, 5, "32-Bit Frozen Analog Input Without Flag", Layout::Analog { flags: false, kind: ValueKind::I32, time: false }),
    entry(31, 6, "16-Bit Frozen Analog Input Without Flag", Layout::Analog { flags: false, kind: ValueKind::I16, time: false }),
    entry(31, 7, "32-Bit Frozen Floating Point Input", Layout::Analog { flags: true, kind: ValueKind::F32, time: false }),
    entry(31, 8, "64-Bit Frozen Floating Point Input", Layout::Analog { flags: true, kind: ValueKind::F64, time: false }),
    entry(32, 0, "Analog Input Change Default Variation", Layout::Empty),
    entry(32, 1, "32-Bit Analog Change Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::I32, time: false }),
    entry(32, 2, "16-Bit Analog Change Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::I16, time: false }),
    entry(32, 3, "32-Bit Analog Change Event with Time", Layout::Analog { flags: true, kind: ValueKind::I32, time: true }),
    entry(32, 4, "16-Bit Analog Change Event with Time", Layout::Analog { flags: true, kind: ValueKind::I16, time: true }),
    entry(32, 5, "32-Bit Floating Point Change Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::F32, time: false }),
    entry(32, 6, "64-Bit Floating Point Change Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::F64, time: false }),
    entry(32, 7, "32-Bit Floating Point Change Event w/ Time", Layout::Analog { flags: true, kind: ValueKind::F32, time: true }),
    entry(32, 8, "64-Bit Floating Point Change Event w/ Time", Layout::Analog { flags: true, kind: ValueKind::F64, time: true }),
    entry(33, 1, "32-Bit Frozen Analog Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::I32, time: false }),
    entry(33, 2, "16-Bit Frozen Analog Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::I16, time: false }),
    entry(33, 3, "32-Bit Frozen Analog Event w/ Time", Layout::Analog { flags: true, kind: ValueKind::I32, time: true }),
    entry(33, 4, "16-Bit Frozen Analog Event w/ Time", Layout::Analog { flags: true, kind: ValueKind::I16, time: true }),
    entry(33, 5, "32-Bit Floating Point Frozen Change Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::F32, time: false }),
    entry(33, 6, "64-Bit Floating Point Frozen Change Event w/o Time", Layout::Analog { flags: true, kind: ValueKind::F64, time: false }),
    entry(33, 7, "32-Bit Floating Point Frozen Change Event w/ Time", Layout::Analog { flags: true, kind: ValueKind::F32, time: true }),
    entry(33, 8, "64-Bit Floating Point Frozen Change Event w/ Time", Layout::Analog { flags: true, kind: ValueKind::F64, time: true }),
    entry(34, 0, "Analog Input Deadband Default Variation", Layout::Empty),
    entry(34, 1, "16-Bit Analog Input Deadband", Layout::Deadband { kind: ValueKind::U16 }),
    entry(34, 2, "32-Bit Analog Input Deadband", Layout::Deadband { kind: ValueKind::U32 }),
    entry(34, 3, "32-Bit Floating Point Analog Input Deadband", Layout::Deadband { kind: ValueKind::F32 }),
    entry(40, 0, "Analog Output Default Variation", Layout::Empty),
    entry(40, 1, "32-Bit Analog Output Status", Layout::AnalogOutputStatus { kind: ValueKind::I32, time: false }),
    entry(40, 2, "16-Bit Analog Output Status", Layout::AnalogOutputStatus { kind: ValueKind::I16, time: false }),
    entry(40, 3, "32-Bit Floating Point Output Status", Layout::AnalogOutputStatus { kind: ValueKind::F32, time: false }),
    entry(40, 4, "64-Bit Floating Point Output Status", Layout::AnalogOutputStatus { kind: ValueKind::F64, time: false }),
    entry(41, 1, "32-Bit Analog Output Block", Layout::AnalogOutputBlock { kind: ValueKind::I32 }),
    entry(41, 2, "16-Bit Analog Output Block", Layout::AnalogOutputBlock { kind: ValueKind::I16 }),
    entry(41, 3, "32-Bit Floating Point Output Block", Layout::AnalogOutputBlock { kind: ValueKind::F32 }),
    entry(41, 4, "64-Bit Floating Point Output Block", Layout::AnalogOutputBlock { kind: ValueKind::F64 }),
    entry(42, 0, "Analog Output Event Default Variation", Layout::Empty),
    entry(42, 1, "32-Bit Analog Output Event w/o Time", Layout::AnalogOutputStatus { kind: ValueKind::I32, time: false }),
    entry(42, 2, "16-Bit Analog Output Event w/o Time", Layout::AnalogOutputStatus { kind: ValueKind::I16, time: false }),
    entry(42, 3, "32-Bit Analog Output Event with Time", Layout::AnalogOutputStatus { kind: ValueKind::I32, time: true }),
    entry(42, 4, "16-Bit Analog Output Event with Time", Layout::AnalogOutputStatus { kind: ValueKind::I16, time: true }),
    entry(42, 5, "32-Bit Floating Point Output Event w/o Time", Layout::AnalogOutputStatus { kind: ValueKind::F32, time: false }),
    entry(42, 6, "64-Bit Floating Point Output Event w/o Time", Layout::AnalogOutputStatus { kind: ValueKind::F64, time: false }),
    entry(42, 7, "32-Bit Floating Point Output Event w/ Time", Layout::AnalogOutputStatus { kind: ValueKind::F32, time: true }),
    entry(42, 8, "64-Bit Floating Point Output Event w/ Time", Layout::AnalogOutputStatus { kind: ValueKind::F64, time: true }),
    entry(43, 1, "32-Bit Analog Output Command Event w/o Time", Layout::AnalogCommandEvent { kind: ValueKind::I32, time: false }),
    entry(43, 2, "16-Bit Analog Output Command Event w/o Time", Layout::AnalogCommandEvent { kind: ValueKind::I16, time: false }),
    entry(43, 3, "32-Bit Analog Output Command Event with Time", Layout::AnalogCommandEvent { kind: ValueKind::I32, time: true }),
    entry(43, 4, "16-Bit Analog Output Command Event with Time", Layout::AnalogCommandEvent { kind: ValueKind::I16, time: true }),
    entry(43, 5, "32-Bit Floating Point Output Event w/o Time", Layout::AnalogCommandEvent { kind: ValueKind::F32, time: false }),
    entry(43, 6, "64-Bit Floating Point Output Event w/o Time", Layout::AnalogCommandEvent { kind: ValueKind::F64, time: false }),
    entry(43, 7, "32-Bit Floating Point Output Event w/ Time", Layout::AnalogCommandEvent { kind: ValueKind::F32, time: true }),
    entry(43, 8, "64-Bit Floating Point Output Event w/ Time", Layout::AnalogCommandEvent { kind: ValueKind::F64, time: true }),
    entry(50, 0, "Time and Date Default Variations", Layout::Empty),
    entry(50, 1, "Time and Date", Layout::Time { sets_cto: true }),
    entry(50, 2, "Time and Date w/Interval", Layout::TimeInterval),
    entry(50, 3, "Last Recorded Time and Date", Layout::Time { sets_cto: false }),
    entry(51, 1, "Time and Date CTO", Layout::Time { sets_cto: true }),
    entry(51, 2, "Unsynchronized Time and Date CTO", Layout::Time { sets_cto: true }),
    entry(52, 1, "Time Delay - Coarse", Layout::Delay { fine: false }),
    entry(52, 2, "Time Delay - Fine", Layout::Delay { fine: true }),
    entry(60, 1, "Class 0 Data", Layout::Empty),
    entry(60, 2, "Class 1 Data", Layout::Empty),
    entry(60, 3, "Class 2 Data", Layout::Empty),
    entry(60, 4, "Class 3 Data", Layout::Empty),
    entry(70, 3, "File Control - File Command", Layout::File(FileLayout::Command)),
    entry(70, 4, "File Control - File Status", Layout::File(FileLayout::CommandStatus)),
    entry(70, 5, "File Control - File Transport", Layout::File(FileLayout::Transport)),
    entry(70, 6, "File Control - File Transport Status", Layout::File(FileLayout::TransportStatus)),
    entry(80, 1, "Internal Indications", Layout::IinBit),
    entry(85, 1, "Data-Set Prototype, with UUID", Layout::Opaque),
    entry(86, 1, "Data-Set Descriptor, Data-Set Contents", Layout::Opaque),
    entry(86, 2, "Data-Set Descriptor, Characteristics", Layout::Opaque),
    entry(86, 3, "Data-Set Descriptor, Point Index Attributes", Layout::Opaque),
    entry(87, 1, "Data-Set, Present Value", Layout::Opaque),
    entry(88, 1, "Data-Set, Snapshot", Layout::Opaque),
    entry(110, 0, "Octet String", Layout::OctetString),
    entry(111, 0, "Octet String Event", Layout::OctetString),
    entry(112, 0, "Virtual Terminal Output Block", Layout::Opaque),
    entry(113, 0, "Virtual Terminal Event Data", Layout::Opaque),
    entry(120, 1, "Authentication Challenge", Layout::Auth(AuthLayout::Challenge)),
    entry(120, 2, "Authentication Reply", Layout::Auth(AuthLayout::Reply)),
    entry(120, 3, "Authentication Aggressive Mode Request", Layout::Auth(AuthLayout::AggressiveModeRequest)),
    entry(120, 4, "Authentication Session Key Status Request", Layout::Auth(AuthLayout::SessionKeyStatusRequest)),
    entry(120, 5, "Authentication Session Key Status", Layout::Auth(AuthLayout::SessionKeyStatus)),
    entry(120, 6, "Authentication Session Key Change", Layout::Auth(AuthLayout::SessionKeyChange)),
    entry(120, 7, "Authentication Error", Layout::Auth(AuthLayout::Error)),
    entry(120, 9, "Authentication Message Authentication Code", Layout::Auth(AuthLayout::Mac)),
    entry(120, 11, "Authentication Update Key Change Request", Layout::Auth(AuthLayout::UpdateKeyChangeRequest)),
    entry(120, 12, "Authentication Update Key Change Reply", Layout::Auth(AuthLayout::UpdateKeyChangeReply)),
    entry(120, 13, "Authentication Update Key Change", Layout::Auth(AuthLayout::UpdateKeyChange)),
    entry(120, 15, "Authentication Update Key Change Confirmation", Layout::Auth(AuthLayout::UpdateKeyChangeConfirmation)),
    entry(121, 1, "Security Statistics", Layout::SecurityStatistic { time: false }),
    entry(122, 1, "Security Statistic Event", Layout::SecurityStatistic { time: false }),
    entry(122, 2, "Security Statistic Event w/ Time", Layout::SecurityStatistic { time: true }),
];

#[cfg(test)]
mod tests {
    use super::{CATALOG, Layout, TimeField, ValueKind, is_octet_group, lookup};

    #[test]
    fn catalog_is_sorted_and_unique() {
        for pair in CATALOG.windows(2) {
            assert!(
                (pair[0].group, pair[0].variation) < (pair[1].group, pair[1].variation),
                "{}/{} out of order",
                pair[1].group,
                pair[1].variation
            );
        }
    }

    #[test]
    fn lookup_finds_known_objects() {
        let def = lookup(31, 3).unwrap();
        assert_eq!(def.name, "32-Bit Frozen Analog Input w/ Time of Freeze");
        assert_eq!(
            def.layout,
            Layout::Analog {
                flags: true,
                kind: ValueKind::I32,
                time: true
            }
        );
        assert_eq!(
            lookup(2, 3).unwrap().layout,
            Layout::Binary {
                family: super::FlagFamily::BinaryInput,
                time: TimeField::Relative
            }
        );
        assert_eq!(lookup(60, 2).unwrap().layout, Layout::Empty);
        assert_eq!(lookup(0, 252).unwrap().layout, Layout::DeviceAttribute);
    }

    #[test]
    fn unknown_pairs_are_absent() {
        assert!(lookup(1, 9).is_none());
        assert!(lookup(0, 0).is_none());
        assert!(lookup(200, 1).is_none());
    }

    #[test]
    fn octet_groups_are_stored_under_variation_zero() {
        for group in [110u8, 111] {
            assert!(is_octet_group(group));
            assert_eq!(lookup(group, 0).unwrap().layout, Layout::OctetString);
        }
        for group in [112u8, 113] {
            assert!(!is_octet_group(group));
            assert_eq!(lookup(group, 0).unwrap().layout, Layout::Opaque);
        }
        assert!(!is_octet_group(120));
    }
}
