//! Supply ledger — the committed accumulators and their decimal rendering.
//!
//! Totals are kept in base units (1 coin = 1e8) as exact signed integers.
//! The public rendering divides by 1e8 in integer arithmetic and produces
//! a base-10 string, so values far beyond 2^53 render without loss.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

/// Base units per coin (1e8).
pub const COIN_UNITS: i128 = 100_000_000;

/// A committed view of both accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplySnapshot {
    /// Total supply in base units.
    pub total_sat: i128,
    /// Circulating supply in base units (total minus the combined balance
    /// of the exclusion set). Zero when no exclusion set is configured.
    pub circulating_sat: i128,
}

impl SupplySnapshot {
    /// Total supply rendered in coins as a decimal string.
    pub fn total_coins(&self) -> String {
        format_coins(self.total_sat)
    }

    /// Circulating supply rendered in coins as a decimal string.
    pub fn circulating_coins(&self) -> String {
        format_coins(self.circulating_sat)
    }
}

/// Shared accumulator state.
///
/// Written only by the aggregator at pass-commit points; read concurrently
/// by the query surface. Readers observe either the pre-pass or the fully
/// committed post-pass values, never a partial range sum.
#[derive(Debug, Default)]
pub struct SupplyLedger {
    inner: RwLock<SupplySnapshot>,
}

impl SupplyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-seeded with committed totals.
    pub fn with_snapshot(snapshot: SupplySnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Current committed totals.
    pub fn snapshot(&self) -> SupplySnapshot {
        *self.read()
    }

    /// Fold a completed pass's range sum into the total supply.
    pub(crate) fn commit_total(&self, range_sum: i128) {
        self.write().total_sat += range_sum;
    }

    /// Recompute the circulating supply from the committed total and the
    /// combined exclusion-set balance.
    pub(crate) fn recompute_circulating(&self, excluded_sat: i128) {
        let mut inner = self.write();
        inner.circulating_sat = inner.total_sat - excluded_sat;
    }

    // Commits are single-field writes, so a poisoned lock still holds the
    // last committed totals; reads and writers recover it rather than
    // taking the query surface down with a panicked scan task.
    fn read(&self) -> RwLockReadGuard<'_, SupplySnapshot> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SupplySnapshot> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Render a base-unit amount as a decimal coin string.
///
/// Matches arbitrary-precision `dividedBy(1e8).toString(10)` semantics:
/// no floating point, no rounding, trailing fractional zeros trimmed,
/// whole numbers without a decimal point.
pub fn format_coins(sat: i128) -> String {
    let sign = if sat < 0 { "-" } else { "" };
    let abs = sat.unsigned_abs();
    let whole = abs / COIN_UNITS.unsigned_abs();
    let frac = abs % COIN_UNITS.unsigned_abs();
    if frac == 0 {
        return format!("{sign}{whole}");
    }
    let frac = format!("{frac:08}");
    let frac = frac.trim_end_matches('0');
    format!("{sign}{whole}.{frac}")
}
