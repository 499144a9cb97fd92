//! Advancement coordinator — the single-flight re-entrant state machine.
//!
//! Tip notifications arrive on a queue and only ever record the highest
//! observed tip; the coordinator's own task is the only place a scan pass
//! starts. A notification that lands mid-scan waits in the queue and is
//! drained when the pass finishes, so the loop converges to the latest tip
//! without overlapping passes, without polling, and without unbounded
//! recursion.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::aggregator::RangeAggregator;
use crate::cursor::ScanCursor;
use crate::ledger::SupplyLedger;
use crate::source::ChainSource;

/// Whether a scan pass is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
}

/// Owns the observed tip, the scan state, and the aggregator.
pub struct AdvanceCoordinator<S> {
    aggregator: RangeAggregator<S>,
    tips: mpsc::UnboundedReceiver<u64>,
    observed_tip: u64,
    state: ScanState,
}

impl<S: ChainSource> AdvanceCoordinator<S> {
    pub fn new(aggregator: RangeAggregator<S>, tips: mpsc::UnboundedReceiver<u64>) -> Self {
        let observed_tip = aggregator.cursor().last_checked();
        Self {
            aggregator,
            tips,
            observed_tip,
            state: ScanState::Idle,
        }
    }

    /// Highest tip height ever notified.
    pub fn observed_tip(&self) -> u64 {
        self.observed_tip
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn cursor(&self) -> ScanCursor {
        self.aggregator.cursor()
    }

    pub fn ledger(&self) -> &Arc<SupplyLedger> {
        self.aggregator.ledger()
    }

    /// Process tip notifications until the channel closes.
    pub async fn run(&mut self) {
        while let Some(height) = self.tips.recv().await {
            self.note_tip(height);
            self.advance().await;
        }
        tracing::debug!("tip channel closed; coordinator stopping");
    }

    /// Record a notified height. Stale (lower) and duplicate heights are
    /// tolerated and ignored.
    fn note_tip(&mut self, height: u64) {
        if height > self.observed_tip {
            self.observed_tip = height;
        }
    }

    /// Pull any queued notifications without blocking.
    fn drain_pending(&mut self) {
        while let Ok(height) = self.tips.try_recv() {
            self.note_tip(height);
        }
    }

    /// Run scan passes until the cursor reaches the observed tip.
    ///
    /// A pass failure stops advancement; the preserved cursor is retried
    /// when the next notification arrives.
    async fn advance(&mut self) {
        loop {
            self.drain_pending();
            if !self.aggregator.cursor().is_behind(self.observed_tip) {
                return;
            }
            let target = self.observed_tip;
            self.state = ScanState::Scanning;
            let result = self.aggregator.scan_to(target).await;
            self.state = ScanState::Idle;
            match result {
                Ok(()) => {
                    tracing::info!(to = target, "supply updated");
                }
                Err(error) => {
                    tracing::warn!(
                        %error,
                        target,
                        cursor = self.aggregator.cursor().last_checked(),
                        "scan pass failed; waiting for next tip notification"
                    );
                    return;
                }
            }
        }
    }
}
