//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access and protocol conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Decoders are pure and contain no I/O; sources and analysis layers handle
//! file access and aggregation. Stateful pieces (transport reassembly) are
//! owned by the caller.

pub mod dnp3;
