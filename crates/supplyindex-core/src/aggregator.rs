//! Block-range aggregator — computes per-block reward deltas over a
//! height range and commits the range sum to the ledger.
//!
//! Blocks are fetched strictly sequentially in ascending order. The cursor
//! advances per block on success (durable partial progress for resumption),
//! but the delta sum for the range is committed to the ledger exactly once,
//! at the end of a fully successful pass. A failure partway through keeps
//! the cursor at the last processed block and discards the in-memory
//! partial sum.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SupplyConfig;
use crate::cursor::ScanCursor;
use crate::error::SupplyError;
use crate::ledger::SupplyLedger;
use crate::source::ChainSource;

/// Scans `(cursor, target]` ranges and folds reward deltas into the ledger.
pub struct RangeAggregator<S> {
    source: Arc<S>,
    ledger: Arc<SupplyLedger>,
    cursor: ScanCursor,
    exclusion_addresses: Vec<String>,
    fetch_timeout: Option<Duration>,
}

impl<S: ChainSource> RangeAggregator<S> {
    pub fn new(source: Arc<S>, ledger: Arc<SupplyLedger>, config: &SupplyConfig) -> Self {
        Self {
            source,
            ledger,
            cursor: ScanCursor::new(config.start_height),
            exclusion_addresses: config.exclusion_addresses.clone(),
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Current scan position.
    pub fn cursor(&self) -> ScanCursor {
        self.cursor
    }

    /// The ledger this aggregator commits into.
    pub fn ledger(&self) -> &Arc<SupplyLedger> {
        &self.ledger
    }

    /// Run one pass over `(cursor, target]`.
    ///
    /// On success the cursor sits at `target` and the range sum is
    /// committed. On error the cursor sits at the last fully processed
    /// height and the ledger is untouched (except that a balance-query
    /// failure happens after the total commit, by design of the upstream
    /// commit ordering).
    pub async fn scan_to(&mut self, target: u64) -> Result<(), SupplyError> {
        if !self.cursor.is_behind(target) {
            return Ok(());
        }
        let from = self.cursor.next_height();
        tracing::info!(from, to = target, "starting supply scan");

        let mut range_sum: i128 = 0;
        for height in from..=target {
            range_sum += self.block_delta(height).await?;
            self.cursor.advance(height);
        }

        self.ledger.commit_total(range_sum);
        tracing::debug!(
            to = target,
            range_sum,
            total_sat = self.ledger.snapshot().total_sat,
            "range sum committed"
        );

        if !self.exclusion_addresses.is_empty() {
            let excluded = self.fetch_exclusion_balance().await?;
            let excluded =
                i128::try_from(excluded).map_err(|_| SupplyError::BalanceQuery {
                    addresses: self.exclusion_addresses.len(),
                    reason: format!("balance {excluded} exceeds the supported range"),
                })?;
            self.ledger.recompute_circulating(excluded);
        }

        Ok(())
    }

    /// Fetch one block and its reward transaction, returning the net
    /// coin-value delta.
    async fn block_delta(&self, height: u64) -> Result<i128, SupplyError> {
        let block = self.timed(height, self.source.block_overview(height)).await?;
        let flags = block.parse_flags()?;
        let txid = block.reward_txid(flags)?;
        let tx = self.timed(height, self.source.transaction(txid)).await?;
        Ok(tx.delta(flags))
    }

    async fn fetch_exclusion_balance(&self) -> Result<u128, SupplyError> {
        let addresses = &self.exclusion_addresses;
        let fut = self.source.address_balance(addresses);
        match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(SupplyError::BalanceQuery {
                    addresses: addresses.len(),
                    reason: format!("timed out after {} ms", limit.as_millis()),
                }),
            },
            None => fut.await,
        }
    }

    /// Apply the configured fetch timeout to a source call.
    async fn timed<T>(
        &self,
        height: u64,
        fut: impl Future<Output = Result<T, SupplyError>>,
    ) -> Result<T, SupplyError> {
        match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(SupplyError::FetchTimeout {
                    height,
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => fut.await,
        }
    }
}
