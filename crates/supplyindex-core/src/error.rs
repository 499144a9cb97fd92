//! Error types for the supply aggregation pipeline.

use thiserror::Error;

/// Errors that can abort a scan pass.
#[derive(Debug, Error)]
pub enum SupplyError {
    #[error("fetch failed at height {height}: {reason}")]
    Fetch { height: u64, reason: String },

    #[error("fetch timed out at height {height} after {timeout_ms} ms")]
    FetchTimeout { height: u64, timeout_ms: u64 },

    #[error("unexpected block type '{flags}' at height {height}")]
    UnexpectedBlockType { height: u64, flags: String },

    #[error("block {height} has no transaction at reward index {index}")]
    MissingRewardTx { height: u64, index: usize },

    #[error("balance query failed for {addresses} exclusion address(es): {reason}")]
    BalanceQuery { addresses: usize, reason: String },

    #[error("tip subscription failed: {0}")]
    Subscription(String),

    #[error("{0}")]
    Other(String),
}

impl SupplyError {
    /// Returns `true` if the error came from a block or transaction fetch
    /// (including a timeout), as opposed to a balance query or bad data.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::FetchTimeout { .. })
    }
}
