//! Frame-level facade: link header, chunks, transport and application.

use std::net::IpAddr;

use serde::Serialize;
use tracing::{debug, warn};

use super::annotation::{Annotation, AnnotationKind, Layer, Severity};
use super::application::{ApplicationMessage, parse_application};
use super::chunk::dechunk;
use super::crc::crc16;
use super::error::Dnp3Error;
use super::layout;
use super::link::{LinkHeader, parse_link_header};
use super::transport::{
    ConversationKey, DiscardReason, ReassemblyOutcome, TransportHeader, TransportReassembler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Segments allowed in one reassembled message.
    pub max_segments: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_segments: layout::DEFAULT_MAX_SEGMENTS,
        }
    }
}

/// Everything decoded from one link frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFrame {
    pub link: LinkHeader,
    pub frame_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportHeader>,
    /// Extended transport sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discarded: Option<DiscardReason>,
    /// Set when this frame completed an application message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ApplicationMessage>,
    /// Link and transport anomalies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl DecodedFrame {
    /// Frame annotations followed by those of the completed message.
    pub fn all_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .chain(self.message.iter().flat_map(|message| message.annotations.iter()))
    }
}

/// Stateful decoder shared by every conversation of a capture.
#[derive(Debug)]
pub struct Dnp3Decoder {
    reassembler: TransportReassembler,
}

impl Default for Dnp3Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl Dnp3Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            reassembler: TransportReassembler::with_max_segments(config.max_segments),
        }
    }

    /// Decode one whole frame. `endpoints` (source, destination) separates
    /// conversations that reuse link addresses.
    ///
    /// Returns `Ok(None)` when `frame` does not start with the DNP3 start
    /// bytes.
    pub fn decode_frame(
        &mut self,
        endpoints: Option<(IpAddr, IpAddr)>,
        frame: &[u8],
    ) -> Result<Option<DecodedFrame>, Dnp3Error> {
        let Some(link) = parse_link_header(frame)? else {
            return Ok(None);
        };
        if !link.length_valid() {
            return Err(Dnp3Error::InvalidLinkLength {
                length: link.length,
            });
        }

        let mut decoded = DecodedFrame {
            frame_len: link.frame_len(),
            link,
            transport: None,
            sequence: None,
            discarded: None,
            message: None,
            annotations: Vec::new(),
        };
        let link = &decoded.link;

        if !link.checksum_valid {
            let computed = crc16(&frame[..layout::HEADER_CRC_RANGE.start]);
            decoded.annotations.push(Annotation::new(
                Layer::Link,
                layout::HEADER_CRC_RANGE.start,
                AnnotationKind::HeaderChecksumMismatch,
                format!(
                    "header checksum {:#06x}, computed {computed:#06x}",
                    link.checksum
                ),
            ));
        }

        if !link.carries_user_data() {
            return Ok(Some(decoded));
        }

        let segment = match dechunk(frame, link.payload_len()) {
            Ok(segment) => segment,
            Err(err) => {
                let offset = match err {
                    Dnp3Error::ChunkChecksum { index, .. } => {
                        layout::HEADER_LEN
                            + index * (layout::CHUNK_DATA_LEN + layout::CHUNK_CRC_LEN)
                    }
                    _ => layout::HEADER_LEN,
                };
                push_fatal(&mut decoded.annotations, Layer::Link, offset, &err);
                return Ok(Some(decoded));
            }
        };

        let key = match endpoints {
            Some((src, dst)) => ConversationKey::new(src, dst, link.source, link.destination),
            None => ConversationKey::link_only(link.source, link.destination),
        };
        match self.reassembler.push(key, &segment)? {
            ReassemblyOutcome::Complete {
                header,
                sequence,
                message,
                segments,
                ..
            } => {
                decoded.transport = Some(header);
                decoded.sequence = Some(sequence);
                debug!(
                    source = decoded.link.source,
                    destination = decoded.link.destination,
                    segments,
                    bytes = message.len(),
                    "application message reassembled"
                );
                match parse_application(&message) {
                    Ok(parsed) => {
                        for annotation in &parsed.annotations {
                            if annotation.severity == Severity::Fatal {
                                warn!(offset = annotation.offset, "{}", annotation.message);
                            }
                        }
                        decoded.message = Some(parsed);
                    }
                    Err(err) => {
                        push_fatal(&mut decoded.annotations, Layer::Application, 0, &err);
                    }
                }
            }
            ReassemblyOutcome::Pending {
                header, sequence, ..
            } => {
                decoded.transport = Some(header);
                decoded.sequence = Some(sequence);
            }
            ReassemblyOutcome::Discarded {
                header,
                sequence,
                reason,
            } => {
                decoded.transport = Some(header);
                decoded.sequence = Some(sequence);
                decoded.discarded = Some(reason);
                decoded.annotations.push(Annotation::new(
                    Layer::Transport,
                    0,
                    AnnotationKind::DiscardedSegment,
                    discard_message(reason),
                ));
            }
        }

        Ok(Some(decoded))
    }

    /// Drop reassembly state for every conversation between two hosts once
    /// their session is torn down. Returns the number of conversations
    /// evicted.
    pub fn end_session(&mut self, a: IpAddr, b: IpAddr) -> usize {
        self.reassembler.evict_endpoints(a, b)
    }

    pub fn conversations(&self) -> usize {
        self.reassembler.len()
    }
}

fn push_fatal(annotations: &mut Vec<Annotation>, layer: Layer, offset: usize, err: &Dnp3Error) {
    warn!(offset, error = %err, "frame payload not decoded");
    annotations.push(Annotation::new(
        layer,
        offset,
        err.annotation_kind(),
        err.to_string(),
    ));
}

fn discard_message(reason: DiscardReason) -> String {
    match reason {
        DiscardReason::Orphan => "continuation segment without a first segment".to_string(),
        DiscardReason::Duplicate => "duplicate segment".to_string(),
        DiscardReason::SequenceGap { expected, actual } => {
            format!("sequence gap: expected {expected}, got {actual}")
        }
        DiscardReason::TooManySegments { limit } => {
            format!("message exceeds {limit} segments, dropped")
        }
    }
}

/// Cuts a byte stream into whole frames.
///
/// Bytes before a start marker are skipped. A frame is released once all of
/// its declared length has arrived.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: Vec<u8>,
    skipped: usize,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` and return every frame it completes.
    pub fn push(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(data);
        let mut frames = Vec::new();
        loop {
            match find_start(&self.buffer) {
                Some(0) => {}
                Some(start) => {
                    self.skipped += start;
                    self.buffer.drain(..start);
                }
                None => {
                    // Keep a trailing first marker byte for the next push.
                    let keep = usize::from(self.buffer.last() == Some(&layout::START_BYTES[0]));
                    let drop = self.buffer.len() - keep;
                    self.skipped += drop;
                    self.buffer.drain(..drop);
                    break;
                }
            }
            if self.buffer.len() < layout::HEADER_LEN {
                break;
            }
            let length = self.buffer[layout::LENGTH_OFFSET];
            if usize::from(length) < layout::LENGTH_OVERHEAD {
                self.skipped += 1;
                self.buffer.drain(..1);
                continue;
            }
            let needed = super::link::frame_len(length);
            if self.buffer.len() < needed {
                break;
            }
            frames.push(self.buffer.drain(..needed).collect());
        }
        frames
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes dropped while searching for a start marker.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Split one datagram into frames. A trailing partial frame is returned as
/// is so the decoder can report it.
pub fn split_datagram(data: &[u8]) -> Vec<&[u8]> {
    let mut frames = Vec::new();
    let mut rest = data;
    while rest.len() >= layout::HEADER_LEN && rest[layout::START_RANGE] == layout::START_BYTES {
        let length = rest[layout::LENGTH_OFFSET];
        if usize::from(length) < layout::LENGTH_OVERHEAD {
            break;
        }
        let take = super::link::frame_len(length).min(rest.len());
        let (frame, tail) = rest.split_at(take);
        frames.push(frame);
        rest = tail;
    }
    frames
}

fn find_start(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(layout::START_BYTES.len())
        .position(|window| window == layout::START_BYTES)
}
