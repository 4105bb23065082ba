//! Transport segment reassembly.
//!
//! Each conversation tracks the last extended sequence number and at most one
//! in-progress run. A segment with FIR set always starts a new run and drops
//! whatever was accumulating; a segment with FIN set completes the run.
//!
//! A continuation that does not follow the run's last segment is discarded
//! and the run stays open. The missing segment, late or retransmitted, then
//! resumes it. A segment that never arrives leaves the run open until the next
//! FIR supersedes it. Nothing expires on its own: callers evict conversations
//! when a session ends.

use std::collections::HashMap;
use std::net::IpAddr;

use serde::Serialize;
use tracing::debug;

use super::error::Dnp3Error;
use super::layout;

const FIN: u8 = 0x80;
const FIR: u8 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransportHeader {
    pub fin: bool,
    pub fir: bool,
    pub sequence: u8,
}

impl TransportHeader {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            fin: byte & FIN != 0,
            fir: byte & FIR != 0,
            sequence: byte & layout::TRANSPORT_SEQUENCE_MASK,
        }
    }
}

/// Widen a 6-bit transport sequence into a monotonic value.
///
/// A FIR segment always advances one full cycle. Otherwise the value closest
/// to `prev` within half a cycle wins, so late frames from before a wrap map
/// backwards instead of forwards.
///
/// # Examples
/// ```text
/// use dnpshark_core::protocols::dnp3::transport::extend_sequence;
///
/// assert_eq!(extend_sequence(63, 0, false), 64);
/// assert_eq!(extend_sequence(130, 5, true), 197);
/// ```
pub fn extend_sequence(prev: i64, raw: u8, first: bool) -> i64 {
    let raw = i64::from(raw & layout::TRANSPORT_SEQUENCE_MASK);
    let mut ext = (prev & !i64::from(layout::TRANSPORT_SEQUENCE_MASK)) | raw;
    if first {
        ext += layout::SEQUENCE_CYCLE;
    } else if ext + layout::SEQUENCE_WINDOW < prev {
        ext += layout::SEQUENCE_CYCLE;
    } else if prev + layout::SEQUENCE_WINDOW < ext {
        ext -= layout::SEQUENCE_CYCLE;
    }
    ext
}

/// Identity of one direction of a DNP3 conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConversationKey {
    pub src_ip: Option<IpAddr>,
    pub dst_ip: Option<IpAddr>,
    pub link_source: u16,
    pub link_destination: u16,
}

impl ConversationKey {
    pub fn new(src_ip: IpAddr, dst_ip: IpAddr, link_source: u16, link_destination: u16) -> Self {
        Self {
            src_ip: Some(src_ip),
            dst_ip: Some(dst_ip),
            link_source,
            link_destination,
        }
    }

    /// Key for byte streams without network endpoints.
    pub fn link_only(link_source: u16, link_destination: u16) -> Self {
        Self {
            src_ip: None,
            dst_ip: None,
            link_source,
            link_destination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DiscardReason {
    /// Continuation segment with no run in progress.
    Orphan,
    /// Same extended sequence as the previous segment of the run.
    Duplicate,
    SequenceGap { expected: i64, actual: i64 },
    /// The run exceeded the configured segment cap and was dropped.
    TooManySegments { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyOutcome {
    Complete {
        header: TransportHeader,
        sequence: i64,
        message: Vec<u8>,
        segments: usize,
        /// Bytes of an earlier run dropped by this FIR segment.
        superseded: Option<usize>,
    },
    Pending {
        header: TransportHeader,
        sequence: i64,
        segments: usize,
        superseded: Option<usize>,
    },
    Discarded {
        header: TransportHeader,
        sequence: i64,
        reason: DiscardReason,
    },
}

#[derive(Debug)]
struct Run {
    last_sequence: i64,
    data: Vec<u8>,
    segments: usize,
}

#[derive(Debug)]
struct ConversationState {
    last_sequence: i64,
    run: Option<Run>,
}

#[derive(Debug)]
pub struct TransportReassembler {
    conversations: HashMap<ConversationKey, ConversationState>,
    max_segments: usize,
}

impl Default for TransportReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportReassembler {
    pub fn new() -> Self {
        Self::with_max_segments(layout::DEFAULT_MAX_SEGMENTS)
    }

    pub fn with_max_segments(max_segments: usize) -> Self {
        Self {
            conversations: HashMap::new(),
            max_segments: max_segments.max(1),
        }
    }

    /// Feed one de-chunked segment (transport byte included).
    pub fn push(
        &mut self,
        key: ConversationKey,
        segment: &[u8],
    ) -> Result<ReassemblyOutcome, Dnp3Error> {
        let (&control, body) = segment.split_first().ok_or(Dnp3Error::EmptySegment)?;
        let header = TransportHeader::from_byte(control);
        let state = self
            .conversations
            .entry(key)
            .or_insert_with(|| ConversationState {
                last_sequence: i64::from(header.sequence),
                run: None,
            });

        let sequence = extend_sequence(state.last_sequence, header.sequence, header.fir);
        state.last_sequence = sequence;

        if header.fir {
            let superseded = state.run.take().map(|run| run.data.len());
            if let Some(bytes) = superseded {
                debug!(sequence, bytes, "FIR segment supersedes partial message");
            }
            if header.fin {
                return Ok(ReassemblyOutcome::Complete {
                    header,
                    sequence,
                    message: body.to_vec(),
                    segments: 1,
                    superseded,
                });
            }
            state.run = Some(Run {
                last_sequence: sequence,
                data: body.to_vec(),
                segments: 1,
            });
            return Ok(ReassemblyOutcome::Pending {
                header,
                sequence,
                segments: 1,
                superseded,
            });
        }

        let discard = |reason: DiscardReason| -> Result<ReassemblyOutcome, Dnp3Error> {
            debug!(sequence, ?reason, "transport segment discarded");
            Ok(ReassemblyOutcome::Discarded {
                header,
                sequence,
                reason,
            })
        };

        let Some(run) = state.run.as_mut() else {
            return discard(DiscardReason::Orphan);
        };
        if sequence == run.last_sequence {
            return discard(DiscardReason::Duplicate);
        }
        if sequence != run.last_sequence + 1 {
            let expected = run.last_sequence + 1;
            return discard(DiscardReason::SequenceGap {
                expected,
                actual: sequence,
            });
        }
        if run.segments >= self.max_segments {
            state.run = None;
            return discard(DiscardReason::TooManySegments {
                limit: self.max_segments,
            });
        }

        run.data.extend_from_slice(body);
        run.segments += 1;
        run.last_sequence = sequence;
        let segments = run.segments;

        if header.fin {
            let message = state.run.take().map(|run| run.data).unwrap_or_default();
            return Ok(ReassemblyOutcome::Complete {
                header,
                sequence,
                message,
                segments,
                superseded: None,
            });
        }

        Ok(ReassemblyOutcome::Pending {
            header,
            sequence,
            segments,
            superseded: None,
        })
    }

    /// Bytes accumulated for an open run, if any.
    pub fn pending_bytes(&self, key: &ConversationKey) -> Option<usize> {
        self.conversations
            .get(key)
            .and_then(|state| state.run.as_ref())
            .map(|run| run.data.len())
    }

    /// Drop all state for one conversation. Returns true when it existed.
    pub fn evict(&mut self, key: &ConversationKey) -> bool {
        self.conversations.remove(key).is_some()
    }

    /// Evict every conversation between two hosts, in both directions.
    pub fn evict_endpoints(&mut self, a: IpAddr, b: IpAddr) -> usize {
        let keys: Vec<ConversationKey> = self
            .conversations
            .keys()
            .filter(|key| {
                matches!(
                    (key.src_ip, key.dst_ip),
                    (Some(src), Some(dst)) if (src, dst) == (a, b) || (src, dst) == (b, a)
                )
            })
            .cloned()
            .collect();
        for key in &keys {
            self.evict(key);
        }
        keys.len()
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
    }

    /// Number of tracked conversations.
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConversationKey, DiscardReason, ReassemblyOutcome, TransportHeader, TransportReassembler,
        extend_sequence,
    };
    use std::net::IpAddr;

    fn key() -> ConversationKey {
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        ConversationKey::new(a, b, 1, 1024)
    }

    fn segment(fir: bool, fin: bool, seq: u8, body: &[u8]) -> Vec<u8> {
        let mut control = seq & 0x3F;
        if fir {
            control |= 0x40;
        }
        if fin {
            control |= 0x80;
        }
        let mut data = vec![control];
        data.extend_from_slice(body);
        data
    }

    fn message(outcome: ReassemblyOutcome) -> Vec<u8> {
        match outcome {
            ReassemblyOutcome::Complete { message, .. } => message,
            other => panic!("expected complete message, got {other:?}"),
        }
    }

    #[test]
    fn header_bits() {
        let header = TransportHeader::from_byte(0xC5);
        assert!(header.fin);
        assert!(header.fir);
        assert_eq!(header.sequence, 5);
    }

    #[test]
    fn extend_sequence_wraps_forward() {
        assert_eq!(extend_sequence(63, 0, false), 64);
        assert_eq!(extend_sequence(64, 1, false), 65);
    }

    #[test]
    fn extend_sequence_first_ignores_low_bits_of_prev() {
        for prev in [0i64, 5, 63, 64, 100, 1000] {
            for raw in [0u8, 1, 31, 63] {
                assert_eq!(
                    extend_sequence(prev, raw, true),
                    (prev & !0x3F) + 64 + i64::from(raw)
                );
            }
        }
    }

    #[test]
    fn extend_sequence_late_frame_maps_backwards() {
        assert_eq!(extend_sequence(128, 62, false), 126);
        assert_eq!(extend_sequence(130, 30, false), 158);
    }

    #[test]
    fn two_segments_reassemble() {
        let mut reassembler = TransportReassembler::new();
        let first = reassembler.push(key(), &segment(true, false, 0, b"AB")).unwrap();
        assert!(matches!(first, ReassemblyOutcome::Pending { segments: 1, .. }));
        assert_eq!(reassembler.pending_bytes(&key()), Some(2));

        let second = reassembler.push(key(), &segment(false, true, 1, b"CD")).unwrap();
        assert_eq!(message(second), b"ABCD");
        assert_eq!(reassembler.pending_bytes(&key()), None);
    }

    #[test]
    fn new_first_segment_discards_partial_run() {
        let mut reassembler = TransportReassembler::new();
        reassembler.push(key(), &segment(true, false, 0, b"AB")).unwrap();
        let restart = reassembler.push(key(), &segment(true, false, 5, b"EF")).unwrap();
        assert!(matches!(
            restart,
            ReassemblyOutcome::Pending {
                superseded: Some(2),
                ..
            }
        ));

        let late = reassembler.push(key(), &segment(false, true, 1, b"CD")).unwrap();
        assert!(matches!(
            late,
            ReassemblyOutcome::Discarded {
                reason: DiscardReason::SequenceGap { .. },
                ..
            }
        ));

        let done = reassembler.push(key(), &segment(false, true, 6, b"GH")).unwrap();
        assert_eq!(message(done), b"EFGH");
    }

    #[test]
    fn late_segment_resumes_run_after_gap() {
        let mut reassembler = TransportReassembler::new();
        reassembler.push(key(), &segment(true, false, 0, b"AB")).unwrap();
        let early = reassembler.push(key(), &segment(false, true, 2, b"EF")).unwrap();
        assert!(matches!(
            early,
            ReassemblyOutcome::Discarded {
                reason: DiscardReason::SequenceGap {
                    expected: 65,
                    actual: 66
                },
                ..
            }
        ));
        assert_eq!(reassembler.pending_bytes(&key()), Some(2));

        let late = reassembler.push(key(), &segment(false, false, 1, b"CD")).unwrap();
        assert!(matches!(late, ReassemblyOutcome::Pending { segments: 2, .. }));
        let resent = reassembler.push(key(), &segment(false, true, 2, b"EF")).unwrap();
        assert_eq!(message(resent), b"ABCDEF");
    }

    #[test]
    fn lost_segment_keeps_run_open_until_next_first() {
        let mut reassembler = TransportReassembler::new();
        reassembler.push(key(), &segment(true, false, 0, b"AB")).unwrap();
        for seq in [2, 3] {
            let outcome = reassembler.push(key(), &segment(false, false, seq, b"..")).unwrap();
            assert!(matches!(
                outcome,
                ReassemblyOutcome::Discarded {
                    reason: DiscardReason::SequenceGap { expected: 65, .. },
                    ..
                }
            ));
        }
        assert_eq!(reassembler.pending_bytes(&key()), Some(2));

        let next = reassembler.push(key(), &segment(true, true, 4, b"XY")).unwrap();
        match next {
            ReassemblyOutcome::Complete {
                message, superseded, ..
            } => {
                assert_eq!(message, b"XY");
                assert_eq!(superseded, Some(2));
            }
            other => panic!("expected complete message, got {other:?}"),
        }
    }

    #[test]
    fn single_segment_message() {
        let mut reassembler = TransportReassembler::new();
        let outcome = reassembler.push(key(), &segment(true, true, 9, &[0xC0, 0x01])).unwrap();
        assert_eq!(message(outcome), vec![0xC0, 0x01]);
    }

    #[test]
    fn continuation_without_run_is_orphan() {
        let mut reassembler = TransportReassembler::new();
        let outcome = reassembler.push(key(), &segment(false, true, 3, b"XY")).unwrap();
        assert!(matches!(
            outcome,
            ReassemblyOutcome::Discarded {
                reason: DiscardReason::Orphan,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_segment_is_ignored() {
        let mut reassembler = TransportReassembler::new();
        reassembler.push(key(), &segment(true, false, 0, b"AB")).unwrap();
        reassembler.push(key(), &segment(false, false, 1, b"CD")).unwrap();
        let dup = reassembler.push(key(), &segment(false, false, 1, b"CD")).unwrap();
        assert!(matches!(
            dup,
            ReassemblyOutcome::Discarded {
                reason: DiscardReason::Duplicate,
                ..
            }
        ));
        let done = reassembler.push(key(), &segment(false, true, 2, b"EF")).unwrap();
        assert_eq!(message(done), b"ABCDEF");
    }

    #[test]
    fn run_crosses_sequence_wrap() {
        let mut reassembler = TransportReassembler::new();
        reassembler.push(key(), &segment(true, false, 62, b"A")).unwrap();
        reassembler.push(key(), &segment(false, false, 63, b"B")).unwrap();
        let done = reassembler.push(key(), &segment(false, true, 0, b"C")).unwrap();
        assert_eq!(message(done), b"ABC");
    }

    #[test]
    fn segment_cap_drops_run() {
        let mut reassembler = TransportReassembler::with_max_segments(2);
        reassembler.push(key(), &segment(true, false, 0, b"A")).unwrap();
        reassembler.push(key(), &segment(false, false, 1, b"B")).unwrap();
        let outcome = reassembler.push(key(), &segment(false, true, 2, b"C")).unwrap();
        assert!(matches!(
            outcome,
            ReassemblyOutcome::Discarded {
                reason: DiscardReason::TooManySegments { limit: 2 },
                ..
            }
        ));
        assert_eq!(reassembler.pending_bytes(&key()), None);
    }

    #[test]
    fn conversations_are_independent_and_evictable() {
        let mut reassembler = TransportReassembler::new();
        let other = ConversationKey::link_only(1024, 1);
        reassembler.push(key(), &segment(true, false, 0, b"AB")).unwrap();
        reassembler.push(other.clone(), &segment(true, false, 0, b"ZZ")).unwrap();
        assert_eq!(reassembler.len(), 2);

        let done = reassembler.push(key(), &segment(false, true, 1, b"CD")).unwrap();
        assert_eq!(message(done), b"ABCD");
        assert_eq!(reassembler.pending_bytes(&other), Some(2));

        assert!(reassembler.evict(&other));
        assert!(!reassembler.evict(&other));
        reassembler.clear();
        assert!(reassembler.is_empty());
    }

    #[test]
    fn evict_endpoints_covers_both_directions() {
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        let c: IpAddr = "10.0.0.3".parse().unwrap();
        let mut reassembler = TransportReassembler::new();
        reassembler.push(key(), &segment(true, false, 0, b"AB")).unwrap();
        let reply = ConversationKey::new(b, a, 1024, 1);
        reassembler.push(reply, &segment(true, false, 0, b"CD")).unwrap();
        let unrelated = ConversationKey::new(a, c, 1, 1024);
        reassembler.push(unrelated.clone(), &segment(true, false, 0, b"EF")).unwrap();
        let unkeyed = ConversationKey::link_only(1, 1024);
        reassembler.push(unkeyed.clone(), &segment(true, false, 0, b"GH")).unwrap();

        assert_eq!(reassembler.evict_endpoints(b, a), 2);
        assert_eq!(reassembler.len(), 2);
        assert_eq!(reassembler.pending_bytes(&unrelated), Some(2));
        assert_eq!(reassembler.pending_bytes(&unkeyed), Some(2));
        assert_eq!(reassembler.evict_endpoints(a, b), 0);
    }

    #[test]
    fn empty_segment_is_an_error() {
        let mut reassembler = TransportReassembler::new();
        assert!(reassembler.push(key(), &[]).is_err());
    }
}
