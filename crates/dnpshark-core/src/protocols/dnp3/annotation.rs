//! Decode anomalies returned alongside decoded records.
//!
//! Advisory annotations never stop decoding. A fatal annotation marks the
//! offset at which decoding of the current frame payload or message ceased.

use serde::Serialize;

/// How an anomaly affects decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Advisory,
    Fatal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Advisory => "warning",
            Severity::Fatal => "error",
        }
    }
}

/// Layer an annotation offset is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Offset into the link frame.
    Link,
    /// Offset into the de-chunked transport segment.
    Transport,
    /// Offset into the reassembled application message.
    Application,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    HeaderChecksumMismatch,
    ChunkChecksumMismatch,
    NegativeOrInvalidItemCount,
    UnknownObjectOrVariation,
    InconsistentLength,
    UnexpectedNonzeroCountForEmptyObjectType,
    ReservedQualifierCode,
    AbnormalInternalIndication,
    DiscardedSegment,
}

impl AnnotationKind {
    /// Stable identifier used in compliance reports.
    pub fn id(self) -> &'static str {
        match self {
            AnnotationKind::HeaderChecksumMismatch => "DNP3-LINK-HEADER-CRC",
            AnnotationKind::ChunkChecksumMismatch => "DNP3-LINK-CHUNK-CRC",
            AnnotationKind::NegativeOrInvalidItemCount => "DNP3-APP-ITEM-COUNT",
            AnnotationKind::UnknownObjectOrVariation => "DNP3-APP-UNKNOWN-OBJECT",
            AnnotationKind::InconsistentLength => "DNP3-LENGTH",
            AnnotationKind::UnexpectedNonzeroCountForEmptyObjectType => {
                "DNP3-APP-EMPTY-OBJECT-COUNT"
            }
            AnnotationKind::ReservedQualifierCode => "DNP3-APP-RESERVED-QUALIFIER",
            AnnotationKind::AbnormalInternalIndication => "DNP3-APP-IIN",
            AnnotationKind::DiscardedSegment => "DNP3-TRANSPORT-DISCARD",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            AnnotationKind::ChunkChecksumMismatch
            | AnnotationKind::NegativeOrInvalidItemCount
            | AnnotationKind::InconsistentLength => Severity::Fatal,
            AnnotationKind::HeaderChecksumMismatch
            | AnnotationKind::UnknownObjectOrVariation
            | AnnotationKind::UnexpectedNonzeroCountForEmptyObjectType
            | AnnotationKind::ReservedQualifierCode
            | AnnotationKind::AbnormalInternalIndication
            | AnnotationKind::DiscardedSegment => Severity::Advisory,
        }
    }

    /// Short description shared by every occurrence of this kind.
    pub fn summary(self) -> &'static str {
        match self {
            AnnotationKind::HeaderChecksumMismatch => "Link header checksum mismatch",
            AnnotationKind::ChunkChecksumMismatch => {
                "Data chunk checksum mismatch, frame payload discarded"
            }
            AnnotationKind::NegativeOrInvalidItemCount => "Negative or invalid object item count",
            AnnotationKind::UnknownObjectOrVariation => "Unknown object group or variation",
            AnnotationKind::InconsistentLength => "Declared length exceeds available bytes",
            AnnotationKind::UnexpectedNonzeroCountForEmptyObjectType => {
                "Nonzero item count for an object type that carries no points"
            }
            AnnotationKind::ReservedQualifierCode => "Reserved qualifier code",
            AnnotationKind::AbnormalInternalIndication => "Abnormal internal indication set",
            AnnotationKind::DiscardedSegment => "Transport segment discarded",
        }
    }
}

/// One anomaly found while decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub layer: Layer,
    pub offset: usize,
    pub severity: Severity,
    pub kind: AnnotationKind,
    pub message: String,
}

impl Annotation {
    /// Build an annotation with the kind's default severity.
    pub fn new(
        layer: Layer,
        offset: usize,
        kind: AnnotationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            layer,
            offset,
            severity: kind.default_severity(),
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}
