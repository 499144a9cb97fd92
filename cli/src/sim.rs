//! Deterministic simulated chain for local development.
//!
//! Odd heights are proof-of-work blocks, even heights proof-of-stake; both
//! mint a constant 50-coin subsidy, so height `h` puts `h * 50` coins in
//! supply. The tip starts at 1 and advances on a fixed interval.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use supplyindex_core::{
    BlockOverview, ChainSource, RewardTransaction, SupplyError, TipSubscription, TxInput,
    TxOutput, COIN_UNITS,
};

const SUBSIDY_SAT: u64 = 50 * COIN_UNITS as u64;
const STAKE_SAT: u64 = 400 * COIN_UNITS as u64;

pub struct SimChain {
    blocks: u64,
    interval: Duration,
    tip_tx: mpsc::UnboundedSender<u64>,
    tip_rx: Mutex<Option<mpsc::UnboundedReceiver<u64>>>,
}

impl SimChain {
    pub fn new(blocks: u64, interval: Duration) -> Arc<Self> {
        let (tip_tx, tip_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            blocks,
            interval,
            tip_tx,
            tip_rx: Mutex::new(Some(tip_rx)),
        })
    }

    /// Advance the tip from 2 to `blocks`, one height per interval.
    pub fn start_ticking(self: &Arc<Self>) -> JoinHandle<()> {
        let chain = Arc::clone(self);
        tokio::spawn(async move {
            for height in 2..=chain.blocks {
                tokio::time::sleep(chain.interval).await;
                if chain.tip_tx.send(height).is_err() {
                    return;
                }
            }
            tracing::info!(tip = chain.blocks, "simulated chain fully mined");
        })
    }

    fn is_pow(height: u64) -> bool {
        height % 2 == 1
    }
}

#[async_trait]
impl ChainSource for SimChain {
    async fn tip_subscription(&self) -> Result<TipSubscription, SupplyError> {
        let updates = self
            .tip_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| SupplyError::Subscription("already subscribed".into()))?;
        Ok(TipSubscription {
            current: Some(1),
            updates,
        })
    }

    async fn block_overview(&self, height: u64) -> Result<BlockOverview, SupplyError> {
        if height == 0 || height > self.blocks {
            return Err(SupplyError::Fetch {
                height,
                reason: "block not found".into(),
            });
        }
        let (flags, txids) = if Self::is_pow(height) {
            ("proof-of-work", vec![format!("cb{height}"), format!("pay{height}")])
        } else {
            ("proof-of-stake", vec![format!("mark{height}"), format!("cs{height}")])
        };
        Ok(BlockOverview {
            height,
            hash: format!("simhash{height:08}"),
            flags: flags.to_string(),
            txids,
        })
    }

    async fn transaction(&self, txid: &str) -> Result<RewardTransaction, SupplyError> {
        if txid.starts_with("cb") {
            // Coinbase: mints the subsidy outright.
            return Ok(RewardTransaction {
                txid: txid.to_string(),
                inputs: vec![],
                outputs: vec![TxOutput { value_sat: SUBSIDY_SAT }],
            });
        }
        if txid.starts_with("cs") {
            // Coinstake: returns the stake split in two plus the subsidy.
            let half = (STAKE_SAT + SUBSIDY_SAT) / 2;
            return Ok(RewardTransaction {
                txid: txid.to_string(),
                inputs: vec![TxInput { value_sat: STAKE_SAT }],
                outputs: vec![TxOutput { value_sat: half }, TxOutput { value_sat: half }],
            });
        }
        Err(SupplyError::Fetch {
            height: 0,
            reason: format!("unknown transaction {txid}"),
        })
    }

    async fn address_balance(&self, _addresses: &[String]) -> Result<u128, SupplyError> {
        Ok(0)
    }

    async fn estimate_fee(&self, blocks: u32) -> Result<f64, SupplyError> {
        // Fee relaxes with a longer confirmation target.
        Ok(0.001 / f64::from(blocks.max(1)))
    }
}
