//! Engine wiring — spawns the watcher and coordinator tasks and hands out
//! the shared ledger.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::aggregator::RangeAggregator;
use crate::config::SupplyConfig;
use crate::coordinator::AdvanceCoordinator;
use crate::error::SupplyError;
use crate::ledger::{SupplyLedger, SupplySnapshot};
use crate::source::ChainSource;
use crate::watcher::TipWatcher;

/// Entry point for running the aggregation pipeline.
pub struct SupplyEngine;

impl SupplyEngine {
    /// Subscribe to the source's tip signal and start the watcher and
    /// coordinator tasks.
    ///
    /// If the source already knows a height at subscription time, the
    /// first scan starts immediately without waiting for a push
    /// notification.
    pub async fn start<S: ChainSource>(
        source: Arc<S>,
        config: SupplyConfig,
    ) -> Result<SupplyEngineHandle, SupplyError> {
        let subscription = source.tip_subscription().await?;
        let ledger = Arc::new(SupplyLedger::new());
        let (tip_tx, tip_rx) = mpsc::unbounded_channel();

        let aggregator = RangeAggregator::new(source, Arc::clone(&ledger), &config);
        let mut coordinator = AdvanceCoordinator::new(aggregator, tip_rx);
        let watcher = TipWatcher::new(subscription, tip_tx);

        tracing::info!(
            start_height = config.start_height,
            exclusions = config.exclusion_addresses.len(),
            "supply engine starting"
        );

        Ok(SupplyEngineHandle {
            ledger,
            watcher: tokio::spawn(watcher.run()),
            coordinator: tokio::spawn(async move { coordinator.run().await }),
        })
    }
}

/// Handle to a running engine: the shared ledger plus the task handles.
pub struct SupplyEngineHandle {
    ledger: Arc<SupplyLedger>,
    watcher: JoinHandle<()>,
    coordinator: JoinHandle<()>,
}

impl SupplyEngineHandle {
    /// The ledger the query surface reads from.
    pub fn ledger(&self) -> Arc<SupplyLedger> {
        Arc::clone(&self.ledger)
    }

    /// Current committed totals.
    pub fn snapshot(&self) -> SupplySnapshot {
        self.ledger.snapshot()
    }

    /// Stop both background tasks.
    pub fn shutdown(self) {
        self.watcher.abort();
        self.coordinator.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::FakeChain;
    use std::time::Duration;

    const COIN: u64 = 100_000_000;

    async fn wait_for_total(handle: &SupplyEngineHandle, expected: i128) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while handle.snapshot().total_sat != expected {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("engine did not reach expected total");
    }

    #[tokio::test]
    async fn startup_height_triggers_first_scan() {
        let chain = FakeChain::new();
        for h in 1..=5 {
            chain.add_pow_block(h, &[COIN]);
        }
        chain.set_current_height(5);

        let handle = SupplyEngine::start(chain.clone(), SupplyConfig::default())
            .await
            .unwrap();
        wait_for_total(&handle, 5 * COIN as i128).await;
        handle.shutdown();
    }

    #[tokio::test]
    async fn pushed_tips_advance_the_ledger() {
        let chain = FakeChain::new();
        for h in 1..=8 {
            chain.add_pow_block(h, &[COIN]);
        }
        let tips = chain.tip_sender();

        let handle = SupplyEngine::start(chain.clone(), SupplyConfig::default())
            .await
            .unwrap();
        tips.send(5).unwrap();
        wait_for_total(&handle, 5 * COIN as i128).await;
        tips.send(8).unwrap();
        wait_for_total(&handle, 8 * COIN as i128).await;

        for h in 1..=8 {
            assert_eq!(chain.block_fetches(h), 1, "height {h} fetched once");
        }
        handle.shutdown();
    }
}
