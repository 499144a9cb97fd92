//! Engine configuration and fluent builder.

use std::time::Duration;

/// Configuration for a supply engine instance.
#[derive(Debug, Clone, Default)]
pub struct SupplyConfig {
    /// Addresses whose combined balance is subtracted from the total to
    /// yield the circulating supply. Empty = circulating supply disabled
    /// (reads return zero, balances are never queried).
    pub exclusion_addresses: Vec<String>,
    /// Heights ≤ `start_height` are treated as already scanned.
    pub start_height: u64,
    /// Optional per-fetch timeout. A hung source call becomes a pass
    /// failure instead of stalling the pipeline forever. `None` = wait
    /// indefinitely (upstream behavior).
    pub fetch_timeout: Option<Duration>,
    /// Floor substituted by the fee-estimation endpoint when the node
    /// reports no estimate (`-1`). `None` = pass `-1` through.
    pub min_estimate_fee: Option<f64>,
}

impl SupplyConfig {
    pub fn builder() -> SupplyConfigBuilder {
        SupplyConfigBuilder::default()
    }

    /// Returns `true` if a circulating-supply exclusion set is configured.
    pub fn has_exclusions(&self) -> bool {
        !self.exclusion_addresses.is_empty()
    }
}

/// Fluent builder for [`SupplyConfig`].
#[derive(Debug, Default)]
pub struct SupplyConfigBuilder {
    config: SupplyConfig,
}

impl SupplyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one exclusion address.
    pub fn exclude_address(mut self, address: impl Into<String>) -> Self {
        self.config.exclusion_addresses.push(address.into());
        self
    }

    /// Replace the exclusion set.
    pub fn exclusion_addresses(mut self, addresses: Vec<String>) -> Self {
        self.config.exclusion_addresses = addresses;
        self
    }

    /// Set the first height treated as unscanned to `height + 1`.
    pub fn start_height(mut self, height: u64) -> Self {
        self.config.start_height = height;
        self
    }

    /// Set the per-fetch timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = Some(timeout);
        self
    }

    /// Set the fee floor used when the node has no estimate.
    pub fn min_estimate_fee(mut self, fee: f64) -> Self {
        self.config.min_estimate_fee = Some(fee);
        self
    }

    pub fn build(self) -> SupplyConfig {
        self.config
    }
}
