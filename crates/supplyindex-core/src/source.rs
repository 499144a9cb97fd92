//! Chain source boundary — the external node the engine aggregates from.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SupplyError;
use crate::types::{BlockOverview, RewardTransaction};

/// A live tip subscription handed out by a [`ChainSource`].
///
/// `current` is the height already known at subscription time (if any);
/// `updates` pushes every subsequent tip change. The source does not
/// deduplicate or order notifications — the coordinator tolerates both.
pub struct TipSubscription {
    /// Height known at subscription time, if the node is already synced.
    pub current: Option<u64>,
    /// Push stream of tip heights.
    pub updates: mpsc::UnboundedReceiver<u64>,
}

/// Trait for the chain data provider the engine scans.
#[async_trait]
pub trait ChainSource: Send + Sync + 'static {
    /// Subscribe to chain-tip notifications.
    async fn tip_subscription(&self) -> Result<TipSubscription, SupplyError>;

    /// Fetch a block overview by height.
    async fn block_overview(&self, height: u64) -> Result<BlockOverview, SupplyError>;

    /// Fetch a transaction by identifier.
    async fn transaction(&self, txid: &str) -> Result<RewardTransaction, SupplyError>;

    /// Combined balance of `addresses` in base units.
    ///
    /// Only invoked when an exclusion set is configured.
    async fn address_balance(&self, addresses: &[String]) -> Result<u128, SupplyError>;

    /// Estimated fee rate (coins per kilobyte) for confirmation within
    /// `blocks` blocks. Returns `-1.0` when the node has no estimate yet.
    async fn estimate_fee(&self, blocks: u32) -> Result<f64, SupplyError>;
}
