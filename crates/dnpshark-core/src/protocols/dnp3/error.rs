use thiserror::Error;

use super::annotation::AnnotationKind;

/// Errors returned by DNP3 decoding and reading.
///
/// Note: this error type lives in an internal module; the example is
/// illustrative and not compiled as a public doctest.
///
/// # Examples
/// ```text
/// use dnpshark_core::protocols::dnp3::error::Dnp3Error;
///
/// let err = Dnp3Error::TooShort { needed: 10, actual: 4 };
/// assert!(err.to_string().contains("payload too short"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Dnp3Error {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid link length: {length}")]
    InvalidLinkLength { length: u8 },
    #[error(
        "chunk checksum mismatch in chunk {index}: computed {computed:#06x}, stored {stored:#06x}"
    )]
    ChunkChecksum {
        index: usize,
        computed: u16,
        stored: u16,
    },
    #[error("negative item count: start {start}, stop {stop}")]
    NegativeCount { start: u32, stop: u32 },
    #[error("inconsistent length at offset {offset}: {context}")]
    InconsistentLength {
        offset: usize,
        context: &'static str,
    },
    #[error("empty transport segment")]
    EmptySegment,
}

impl Dnp3Error {
    /// Annotation kind reported when this error ends decoding.
    pub fn annotation_kind(&self) -> AnnotationKind {
        match self {
            Dnp3Error::ChunkChecksum { .. } => AnnotationKind::ChunkChecksumMismatch,
            Dnp3Error::NegativeCount { .. } => AnnotationKind::NegativeOrInvalidItemCount,
            Dnp3Error::TooShort { .. }
            | Dnp3Error::InvalidLinkLength { .. }
            | Dnp3Error::InconsistentLength { .. }
            | Dnp3Error::EmptySegment => AnnotationKind::InconsistentLength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Dnp3Error;
    use crate::protocols::dnp3::annotation::AnnotationKind;

    #[test]
    fn too_short_maps_to_inconsistent_length() {
        let err = Dnp3Error::TooShort {
            needed: 4,
            actual: 2,
        };
        assert_eq!(err.to_string(), "payload too short: need 4 bytes, got 2");
        assert_eq!(err.annotation_kind(), AnnotationKind::InconsistentLength);
    }

    #[test]
    fn negative_count_is_its_own_kind() {
        let err = Dnp3Error::NegativeCount { start: 5, stop: 3 };
        assert_eq!(
            err.annotation_kind(),
            AnnotationKind::NegativeOrInvalidItemCount
        );
    }
}
