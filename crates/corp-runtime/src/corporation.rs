use corp_core::{
    format_game_cycles, ConfigError, CorpContext, CorpNotice, EngineConfig, StateMachine,
    TransactionError, UnlockId, UpgradeId, UpgradeLevel,
};
use corp_econ::ValuationWindow;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, info};

/// The player's corporation: funds, equity, valuation, upgrades and divisions.
///
/// Share counts always satisfy
/// `total_shares == num_shares + investor_shares + issued_shares`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Corporation<D> {
    pub(crate) name: String,
    pub(crate) seed_funded: bool,
    #[serde(with = "crate::funds_serde")]
    pub(crate) funds: f64,
    /// Revenue per second at the last settlement.
    pub(crate) revenue: f64,
    /// Expenses per second at the last settlement.
    pub(crate) expenses: f64,
    pub(crate) funding_round: u32,
    pub(crate) public: bool,
    pub(crate) total_shares: u64,
    /// Held by the player.
    pub(crate) num_shares: u64,
    pub(crate) investor_shares: u64,
    pub(crate) issued_shares: u64,
    pub(crate) share_price: f64,
    pub(crate) share_sales_until_price_update: u64,
    pub(crate) share_sale_cooldown: i64,
    pub(crate) issue_new_shares_cooldown: i64,
    pub(crate) dividend_rate: f64,
    pub(crate) dividend_tax: f64,
    pub(crate) valuations: ValuationWindow,
    pub(crate) cycle_valuation: f64,
    pub(crate) valuation: f64,
    pub(crate) stored_cycles: u64,
    pub(crate) unlocks: BTreeSet<UnlockId>,
    pub(crate) upgrades: BTreeMap<UpgradeId, UpgradeLevel>,
    pub(crate) divisions: BTreeMap<String, D>,
    pub(crate) state: StateMachine,
    /// Net money owed to the player (dividends, sale proceeds, minus buybacks).
    #[serde(default)]
    pub(crate) owner_income: f64,
    #[serde(default)]
    pub(crate) notices: Vec<CorpNotice>,
    pub(crate) config: EngineConfig,
    pub(crate) rng: ChaCha8Rng,
}

impl<D> Corporation<D> {
    /// Found a corporation. `seed` fixes the share-price noise stream.
    pub fn new(
        name: impl Into<String>,
        seed_funded: bool,
        config: EngineConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let name = name.into();
        info!(%name, seed_funded, seed, "founding corporation");
        Ok(Self {
            name,
            seed_funded,
            funds: config.starting_funds,
            revenue: 0.0,
            expenses: 0.0,
            funding_round: 0,
            public: false,
            total_shares: config.initial_shares,
            num_shares: config.initial_shares,
            investor_shares: 0,
            issued_shares: 0,
            share_price: 0.0,
            share_sales_until_price_update: config.shares_per_price_update,
            share_sale_cooldown: 0,
            issue_new_shares_cooldown: 0,
            dividend_rate: 0.0,
            dividend_tax: config.initial_dividend_tax(),
            valuations: ValuationWindow::new(config.valuation_window),
            cycle_valuation: 0.0,
            valuation: 0.0,
            stored_cycles: 0,
            unlocks: BTreeSet::new(),
            upgrades: BTreeMap::new(),
            divisions: BTreeMap::new(),
            state: StateMachine::new(),
            owner_income: 0.0,
            notices: Vec::new(),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Add `amount` to funds. Non-finite amounts are rejected and logged.
    pub fn add_funds(&mut self, amount: f64) {
        if !amount.is_finite() {
            error!(amount, "refusing to add non-finite amount to corporation funds");
            return;
        }
        self.funds += amount;
    }

    /// Read-only view handed to divisions.
    pub fn context(&self) -> CorpContext<'_> {
        CorpContext {
            funds: self.funds,
            public: self.public,
            seconds_per_market_cycle: self.config.seconds_per_market_cycle,
            upgrades: &self.upgrades,
            unlocks: &self.unlocks,
        }
    }

    /// Context plus mutable divisions, borrowed from disjoint fields.
    pub(crate) fn split_divisions(&mut self) -> (CorpContext<'_>, &mut BTreeMap<String, D>) {
        let ctx = CorpContext {
            funds: self.funds,
            public: self.public,
            seconds_per_market_cycle: self.config.seconds_per_market_cycle,
            upgrades: &self.upgrades,
            unlocks: &self.unlocks,
        };
        (ctx, &mut self.divisions)
    }

    /// Register a division under `name`.
    pub fn add_division(&mut self, name: impl Into<String>, division: D) -> Result<(), TransactionError> {
        let name = name.into();
        if self.divisions.contains_key(&name) {
            return Err(TransactionError::DuplicateDivision(name));
        }
        info!(division = %name, "division added");
        self.divisions.insert(name, division);
        Ok(())
    }

    pub fn remove_division(&mut self, name: &str) -> Result<D, TransactionError> {
        let division = self
            .divisions
            .remove(name)
            .ok_or_else(|| TransactionError::UnknownDivision(name.to_string()))?;
        info!(division = %name, "division removed");
        Ok(division)
    }

    pub fn division(&self, name: &str) -> Option<&D> {
        self.divisions.get(name)
    }

    pub fn division_mut(&mut self, name: &str) -> Option<&mut D> {
        self.divisions.get_mut(name)
    }

    pub fn divisions(&self) -> impl Iterator<Item = (&str, &D)> {
        self.divisions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn division_count(&self) -> usize {
        self.divisions.len()
    }

    /// Drain one-time notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<CorpNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Drain the net money owed to the player.
    pub fn take_owner_income(&mut self) -> f64 {
        std::mem::take(&mut self.owner_income)
    }

    /// Whether the share-count invariant holds.
    pub fn shares_balanced(&self) -> bool {
        self.num_shares
            .checked_add(self.investor_shares)
            .and_then(|s| s.checked_add(self.issued_shares))
            == Some(self.total_shares)
    }

    // Read-only query surface.

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed_funded(&self) -> bool {
        self.seed_funded
    }

    pub fn funds(&self) -> f64 {
        self.funds
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    pub fn expenses(&self) -> f64 {
        self.expenses
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn funding_round(&self) -> u32 {
        self.funding_round
    }

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    pub fn num_shares(&self) -> u64 {
        self.num_shares
    }

    pub fn investor_shares(&self) -> u64 {
        self.investor_shares
    }

    pub fn issued_shares(&self) -> u64 {
        self.issued_shares
    }

    pub fn share_price(&self) -> f64 {
        self.share_price
    }

    pub fn shares_until_price_update(&self) -> u64 {
        self.share_sales_until_price_update
    }

    pub fn dividend_rate(&self) -> f64 {
        self.dividend_rate
    }

    pub fn dividend_tax(&self) -> f64 {
        self.dividend_tax
    }

    pub fn valuation(&self) -> f64 {
        self.valuation
    }

    pub fn cycle_valuation(&self) -> f64 {
        self.cycle_valuation
    }

    pub fn valuation_history(&self) -> impl Iterator<Item = f64> + '_ {
        self.valuations.values()
    }

    pub fn stored_cycles(&self) -> u64 {
        self.stored_cycles
    }

    pub fn state(&self) -> &StateMachine {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_unlock(&self, id: &UnlockId) -> bool {
        self.unlocks.contains(id)
    }

    pub fn unlocks(&self) -> impl Iterator<Item = &UnlockId> {
        self.unlocks.iter()
    }

    pub fn upgrade_level(&self, id: &UpgradeId) -> u32 {
        self.upgrades.get(id).map_or(0, |u| u.level)
    }

    /// Upgrade multiplier, 1.0 when never purchased.
    pub fn upgrade_value(&self, id: &UpgradeId) -> f64 {
        self.upgrades.get(id).map_or(1.0, |u| u.value)
    }

    pub fn share_sale_cooldown(&self) -> i64 {
        self.share_sale_cooldown
    }

    pub fn issue_new_shares_cooldown(&self) -> i64 {
        self.issue_new_shares_cooldown
    }

    /// Time until shares may be sold again, e.g. `"1 hour 0 seconds"`.
    pub fn share_sale_cooldown_remaining(&self) -> String {
        format_game_cycles(self.share_sale_cooldown, self.config.milliseconds_per_game_cycle)
    }

    /// Time until new shares may be issued again.
    pub fn issue_new_shares_cooldown_remaining(&self) -> String {
        format_game_cycles(
            self.issue_new_shares_cooldown,
            self.config.milliseconds_per_game_cycle,
        )
    }
}
