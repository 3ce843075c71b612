//! A minimal division with fixed per-second revenue and expenses.
//!
//! Used by the CLI driver, benches and tests where a full industry
//! simulation is not needed.

use corp_core::{CorpContext, CorpState, Division, UpgradeId};
use serde::{Deserialize, Serialize};

/// Upgrade whose value scales warehouse storage.
const STORAGE_UPGRADE: &str = "Smart Storage";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlatDivision {
    revenue_per_second: f64,
    expenses_per_second: f64,
    /// Relative revenue growth applied at every settlement.
    growth: f64,
    base_storage: f64,
    storage: f64,
    this_cycle_revenue: f64,
    this_cycle_expenses: f64,
    last_cycle_revenue: f64,
    last_cycle_expenses: f64,
}

impl FlatDivision {
    pub fn new(revenue_per_second: f64, expenses_per_second: f64) -> Self {
        Self {
            revenue_per_second,
            expenses_per_second,
            growth: 0.0,
            base_storage: 100.0,
            storage: 100.0,
            this_cycle_revenue: 0.0,
            this_cycle_expenses: 0.0,
            last_cycle_revenue: 0.0,
            last_cycle_expenses: 0.0,
        }
    }

    pub fn with_growth(mut self, growth: f64) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_storage(mut self, storage: f64) -> Self {
        self.base_storage = storage;
        self.storage = storage;
        self
    }

    pub fn storage(&self) -> f64 {
        self.storage
    }

    pub fn revenue_per_second(&self) -> f64 {
        self.revenue_per_second
    }
}

impl Division for FlatDivision {
    fn reset_imports(&mut self, _state: CorpState) {}

    fn process(&mut self, market_cycles: u32, state: CorpState, corp: &CorpContext<'_>) {
        let seconds = market_cycles as f64 * corp.seconds_per_market_cycle;
        match state {
            CorpState::Start => {
                self.last_cycle_revenue = self.this_cycle_revenue / seconds;
                self.last_cycle_expenses = self.this_cycle_expenses / seconds;
                self.this_cycle_revenue = 0.0;
                self.this_cycle_expenses = 0.0;
                self.revenue_per_second *= 1.0 + self.growth;
            }
            CorpState::Purchase => {
                self.this_cycle_expenses += self.expenses_per_second * seconds;
            }
            CorpState::Sale => {
                self.this_cycle_revenue += self.revenue_per_second * seconds;
            }
            CorpState::Production | CorpState::Export => {}
        }
    }

    fn last_cycle_revenue(&self) -> f64 {
        self.last_cycle_revenue
    }

    fn last_cycle_expenses(&self) -> f64 {
        self.last_cycle_expenses
    }

    fn recompute_storage(&mut self, corp: &CorpContext<'_>) {
        self.storage = self.base_storage * corp.upgrade_value(&UpgradeId(STORAGE_UPGRADE.into()));
    }
}
