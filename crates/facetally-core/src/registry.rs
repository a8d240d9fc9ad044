//! Session-scoped registry of already-seen face signatures.

use crate::types::Signature;
use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory set of signatures seen during the current session.
///
/// Unbounded by design: entries are never pruned, never persisted, and the
/// whole set is discarded at process exit. A restart counts from zero and
/// re-registers every face it sees, including ones from prior sessions.
///
/// The set is guarded by an interior mutex so that test-and-insert is a
/// single critical section. The baseline frame loop is a single producer,
/// but if region processing is ever parallelized within a frame, two
/// concurrent sightings of the same new face still register exactly once.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    seen: Mutex<HashSet<Signature>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the signature if absent, in one atomic step.
    ///
    /// Returns `true` iff the signature was not already present. A set
    /// lookup over an exact key type gives no false negatives.
    pub fn test_and_insert(&self, signature: Signature) -> bool {
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.insert(signature)
    }

    /// Number of distinct signatures registered so far.
    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
