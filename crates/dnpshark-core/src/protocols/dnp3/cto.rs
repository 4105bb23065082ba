//! Common time of occurrence for relative timestamps in one message.

/// Most recent absolute time seen in the current application message.
///
/// Scoped to one message: `parse_application` starts every message with a
/// new `ObjectContext` and so with an empty tracker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CtoTracker {
    current: Option<u64>,
}

impl CtoTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, millis: u64) {
        self.current = Some(millis);
    }

    pub fn get(&self) -> Option<u64> {
        self.current
    }

    /// Absolute time for a relative offset, when a CTO is known.
    pub fn resolve(&self, offset_ms: u16) -> Option<u64> {
        self.current
            .map(|base| base.saturating_add(u64::from(offset_ms)))
    }
}
