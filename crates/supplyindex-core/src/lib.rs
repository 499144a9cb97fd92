//! supplyindex-core — incremental coin-supply aggregation engine.
//!
//! # Architecture
//!
//! ```text
//! ChainSource (tip push + block/tx/balance reads)
//!      │
//! TipWatcher ──► AdvanceCoordinator (Idle/Scanning, single-flight)
//!                     └── RangeAggregator (per-block deltas, range-sum commit)
//!                              └── SupplyLedger (total / circulating, 1e8 scale)
//! ```
//!
//! The coordinator owns all mutable scan state and runs on one task; tip
//! notifications only enqueue an advancement attempt. Supply reads go
//! through the shared [`SupplyLedger`] and never touch the scan pipeline.

pub mod aggregator;
pub mod config;
pub mod coordinator;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod source;
pub mod types;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testsupport;

pub use aggregator::RangeAggregator;
pub use config::{SupplyConfig, SupplyConfigBuilder};
pub use coordinator::{AdvanceCoordinator, ScanState};
pub use cursor::ScanCursor;
pub use engine::{SupplyEngine, SupplyEngineHandle};
pub use error::SupplyError;
pub use ledger::{format_coins, SupplyLedger, SupplySnapshot, COIN_UNITS};
pub use source::{ChainSource, TipSubscription};
pub use types::{BlockFlags, BlockOverview, RewardTransaction, TxInput, TxOutput};
pub use watcher::TipWatcher;
