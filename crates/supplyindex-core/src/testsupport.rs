//! Deterministic in-memory chain source for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SupplyError;
use crate::source::{ChainSource, TipSubscription};
use crate::types::{BlockOverview, RewardTransaction, TxInput, TxOutput};

type FetchHook = Box<dyn FnMut(u64) + Send>;

/// Scripted chain source: preloaded blocks and transactions, injectable
/// failures and delays, and counters for every observable interaction.
pub(crate) struct FakeChain {
    blocks: Mutex<HashMap<u64, BlockOverview>>,
    txs: Mutex<HashMap<String, RewardTransaction>>,
    fail_once: Mutex<HashSet<u64>>,
    balance_sat: Mutex<Option<u128>>,
    fail_balance: AtomicBool,
    fees: Mutex<HashMap<u32, f64>>,
    fetch_counts: Mutex<HashMap<u64, u32>>,
    balance_queries: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fetch_delay: Mutex<Option<Duration>>,
    on_block_fetch: Mutex<Option<FetchHook>>,
    current_height: Mutex<Option<u64>>,
    tip_tx: mpsc::UnboundedSender<u64>,
    tip_rx: Mutex<Option<mpsc::UnboundedReceiver<u64>>>,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        let (tip_tx, tip_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            blocks: Mutex::new(HashMap::new()),
            txs: Mutex::new(HashMap::new()),
            fail_once: Mutex::new(HashSet::new()),
            balance_sat: Mutex::new(None),
            fail_balance: AtomicBool::new(false),
            fees: Mutex::new(HashMap::new()),
            fetch_counts: Mutex::new(HashMap::new()),
            balance_queries: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fetch_delay: Mutex::new(None),
            on_block_fetch: Mutex::new(None),
            current_height: Mutex::new(None),
            tip_tx,
            tip_rx: Mutex::new(Some(tip_rx)),
        })
    }

    // ── Scripting ────────────────────────────────────────────────────────

    /// Add a proof-of-work block whose coinbase carries `outputs`.
    pub fn add_pow_block(&self, height: u64, outputs: &[u64]) {
        let txid = format!("cb{height}");
        self.insert_block(height, "proof-of-work", vec![txid.clone(), format!("tx{height}")]);
        self.insert_tx(&txid, &[], outputs);
    }

    /// Add a proof-of-stake block whose coinstake spends `inputs` and
    /// creates `outputs`.
    pub fn add_pos_block(&self, height: u64, inputs: &[u64], outputs: &[u64]) {
        let txid = format!("cs{height}");
        self.insert_block(
            height,
            "proof-of-stake",
            vec![format!("marker{height}"), txid.clone()],
        );
        self.insert_tx(&txid, inputs, outputs);
    }

    /// Add a block with an arbitrary flags discriminator.
    pub fn add_flagged_block(&self, height: u64, flags: &str, txids: &[&str]) {
        self.insert_block(height, flags, txids.iter().map(|s| s.to_string()).collect());
    }

    /// Make the next fetch of `height` fail, then succeed afterwards.
    pub fn fail_block_once(&self, height: u64) {
        self.fail_once.lock().unwrap().insert(height);
    }

    /// Set the combined exclusion-set balance.
    pub fn set_balance(&self, sat: u128) {
        *self.balance_sat.lock().unwrap() = Some(sat);
    }

    /// Make the next balance query fail.
    pub fn fail_next_balance(&self) {
        self.fail_balance.store(true, Ordering::SeqCst);
    }

    /// Script a fee estimate for a confirmation target.
    pub fn set_fee(&self, blocks: u32, fee: f64) {
        self.fees.lock().unwrap().insert(blocks, fee);
    }

    /// Delay every block/transaction fetch (for timeout and overlap tests).
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Invoke `hook` at the start of every block fetch.
    pub fn on_block_fetch(&self, hook: impl FnMut(u64) + Send + 'static) {
        *self.on_block_fetch.lock().unwrap() = Some(Box::new(hook));
    }

    /// Height reported as already known when the subscription is taken.
    pub fn set_current_height(&self, height: u64) {
        *self.current_height.lock().unwrap() = Some(height);
    }

    /// Sender for pushing tip notifications to the subscriber.
    pub fn tip_sender(&self) -> mpsc::UnboundedSender<u64> {
        self.tip_tx.clone()
    }

    // ── Observations ─────────────────────────────────────────────────────

    /// How many times the block at `height` was fetched.
    pub fn block_fetches(&self, height: u64) -> u32 {
        self.fetch_counts.lock().unwrap().get(&height).copied().unwrap_or(0)
    }

    /// How many balance queries were issued.
    pub fn balance_queries(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently outstanding fetches observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn insert_block(&self, height: u64, flags: &str, txids: Vec<String>) {
        self.blocks.lock().unwrap().insert(
            height,
            BlockOverview {
                height,
                hash: format!("hash{height}"),
                flags: flags.to_string(),
                txids,
            },
        );
    }

    fn insert_tx(&self, txid: &str, inputs: &[u64], outputs: &[u64]) {
        self.txs.lock().unwrap().insert(
            txid.to_string(),
            RewardTransaction {
                txid: txid.to_string(),
                inputs: inputs.iter().map(|&value_sat| TxInput { value_sat }).collect(),
                outputs: outputs.iter().map(|&value_sat| TxOutput { value_sat }).collect(),
            },
        );
    }

    async fn maybe_delay(&self) {
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn enter(&self) {
        let n = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(n, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainSource for FakeChain {
    async fn tip_subscription(&self) -> Result<TipSubscription, SupplyError> {
        let updates = self
            .tip_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| SupplyError::Subscription("already subscribed".into()))?;
        Ok(TipSubscription {
            current: *self.current_height.lock().unwrap(),
            updates,
        })
    }

    async fn block_overview(&self, height: u64) -> Result<BlockOverview, SupplyError> {
        self.enter();
        let result = async {
            self.maybe_delay().await;
            if let Some(hook) = self.on_block_fetch.lock().unwrap().as_mut() {
                hook(height);
            }
            *self.fetch_counts.lock().unwrap().entry(height).or_insert(0) += 1;
            if self.fail_once.lock().unwrap().remove(&height) {
                return Err(SupplyError::Fetch {
                    height,
                    reason: "injected failure".into(),
                });
            }
            self.blocks
                .lock()
                .unwrap()
                .get(&height)
                .cloned()
                .ok_or_else(|| SupplyError::Fetch {
                    height,
                    reason: "unknown block".into(),
                })
        }
        .await;
        self.exit();
        result
    }

    async fn transaction(&self, txid: &str) -> Result<RewardTransaction, SupplyError> {
        self.enter();
        let result = async {
            self.maybe_delay().await;
            self.txs
                .lock()
                .unwrap()
                .get(txid)
                .cloned()
                .ok_or_else(|| SupplyError::Fetch {
                    height: 0,
                    reason: format!("unknown transaction {txid}"),
                })
        }
        .await;
        self.exit();
        result
    }

    async fn address_balance(&self, addresses: &[String]) -> Result<u128, SupplyError> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance.swap(false, Ordering::SeqCst) {
            return Err(SupplyError::BalanceQuery {
                addresses: addresses.len(),
                reason: "injected failure".into(),
            });
        }
        self.balance_sat
            .lock()
            .unwrap()
            .ok_or_else(|| SupplyError::BalanceQuery {
                addresses: addresses.len(),
                reason: "no balance scripted".into(),
            })
    }

    async fn estimate_fee(&self, blocks: u32) -> Result<f64, SupplyError> {
        Ok(self.fees.lock().unwrap().get(&blocks).copied().unwrap_or(-1.0))
    }
}
