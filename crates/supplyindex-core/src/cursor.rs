//! Scan cursor — the highest block fully folded into the accumulators.

use serde::{Deserialize, Serialize};

/// The aggregator's position in the chain.
///
/// The cursor only moves forward, and only after a block's reward delta
/// has been computed. A failed pass leaves it at the last success, so the
/// next attempt resumes there instead of from scratch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanCursor {
    last_checked: u64,
}

impl ScanCursor {
    /// Create a cursor positioned at `start` (heights ≤ `start` are
    /// considered already checked).
    pub fn new(start: u64) -> Self {
        Self { last_checked: start }
    }

    /// Highest height fully folded into the accumulators.
    pub fn last_checked(&self) -> u64 {
        self.last_checked
    }

    /// The next height to scan (cursor + 1).
    pub fn next_height(&self) -> u64 {
        self.last_checked + 1
    }

    /// Returns `true` if there are unchecked blocks below `tip`.
    pub fn is_behind(&self, tip: u64) -> bool {
        self.last_checked < tip
    }

    /// Advance the cursor to a newly checked height.
    pub fn advance(&mut self, height: u64) {
        debug_assert!(height > self.last_checked, "cursor must move forward");
        self.last_checked = height;
    }
}
