//! Contract between the corporation and its divisions.
//!
//! Divisions own their production, warehouse and employee simulation. The
//! corporation only drives them through this trait and reads back the last
//! cycle's revenue and expenses.

use crate::{CorpState, UnlockId, UpgradeId, UpgradeLevel};
use std::collections::{BTreeMap, BTreeSet};

/// Read-only view of the corporation handed to divisions while they process.
#[derive(Clone, Copy, Debug)]
pub struct CorpContext<'a> {
    pub funds: f64,
    pub public: bool,
    pub seconds_per_market_cycle: f64,
    pub upgrades: &'a BTreeMap<UpgradeId, UpgradeLevel>,
    pub unlocks: &'a BTreeSet<UnlockId>,
}

impl CorpContext<'_> {
    /// Multiplier of an upgrade, 1.0 when never purchased.
    pub fn upgrade_value(&self, id: &UpgradeId) -> f64 {
        self.upgrades.get(id).map_or(1.0, |u| u.value)
    }

    pub fn has_unlock(&self, id: &UnlockId) -> bool {
        self.unlocks.contains(id)
    }
}

/// A division participating in the market cycle.
///
/// Each `process()` of the corporation first calls [`Division::reset_imports`]
/// on every division and only then [`Division::process`] on every division, so
/// exports delivered during the same phase are never wiped by a later reset.
pub trait Division {
    /// Clear import bookkeeping ahead of this phase.
    fn reset_imports(&mut self, state: CorpState);

    /// Run one phase of the division's simulation.
    fn process(&mut self, market_cycles: u32, state: CorpState, corp: &CorpContext<'_>);

    /// Revenue per second booked during the last full cycle.
    fn last_cycle_revenue(&self) -> f64;

    /// Expenses per second booked during the last full cycle.
    fn last_cycle_expenses(&self) -> f64;

    /// Recompute storage capacity after a storage-affecting upgrade.
    fn recompute_storage(&mut self, _corp: &CorpContext<'_>) {}
}
