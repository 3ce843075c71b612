//! Per-tick accumulation and the market-cycle step.

use crate::Corporation;
use corp_core::{CorpNotice, CorpState, Division};
use corp_econ::{cycle_profit, cycle_valuation, settle_profit, ValuationInputs};
use tracing::{debug, error};

impl<D: Division> Corporation<D> {
    /// Bank `cycles` game cycles for later processing.
    pub fn store_cycles(&mut self, cycles: u64) {
        self.stored_cycles = self.stored_cycles.saturating_add(cycles);
    }

    /// Advance one phase if a full market cycle's worth of game cycles is stored.
    ///
    /// Returns the phase that was processed, or `None` below the threshold.
    /// At most one phase runs per call regardless of the backlog.
    pub fn process(&mut self) -> Option<CorpState> {
        let cycles = self.config.cycles_per_market_cycle;
        if self.stored_cycles < cycles {
            return None;
        }
        self.stored_cycles -= cycles;

        let state = self.state.current();
        let market_cycles = 1u32;

        // Every reset lands before any division runs, so an export delivered
        // this phase survives regardless of division order.
        for division in self.divisions.values_mut() {
            division.reset_imports(state);
        }
        let (ctx, divisions) = self.split_divisions();
        for division in divisions.values_mut() {
            division.process(market_cycles, state, &ctx);
        }

        let elapsed = cycles as i64;
        if self.share_sale_cooldown > 0 {
            self.share_sale_cooldown -= elapsed;
        }
        if self.issue_new_shares_cooldown > 0 {
            self.issue_new_shares_cooldown -= elapsed;
        }

        if state.is_settlement() {
            self.settle(market_cycles);
        }

        self.state.advance();
        Some(state)
    }

    /// Book the previous cycle's profit: valuation, dividends, share price.
    fn settle(&mut self, market_cycles: u32) {
        let (revenue, expenses) = self.aggregate_division_results();
        self.revenue = revenue;
        self.expenses = expenses;
        let profit = revenue - expenses;
        let seconds = market_cycles as f64 * self.config.seconds_per_market_cycle;
        let cycle_profit = cycle_profit(revenue, expenses, seconds);

        self.cycle_valuation = cycle_valuation(&ValuationInputs {
            public: self.public,
            funds: self.funds,
            profit,
            dividend_rate: self.dividend_rate,
            division_count: self.divisions.len(),
            valuation_mult: self.config.multipliers.valuation,
        });
        self.valuation = self.valuations.push(self.cycle_valuation);

        if !self.funds.is_finite() {
            let baseline = self.config.safe_funds_baseline;
            error!(funds = self.funds, baseline, "corporation funds corrupted; resetting");
            self.funds = baseline;
            self.notices.push(CorpNotice::FundsReset { baseline });
        }

        let payout = settle_profit(
            cycle_profit,
            self.dividend_rate,
            self.config.dividend_max_rate,
            self.dividend_tax,
            self.num_shares,
            self.total_shares,
        );
        self.add_funds(payout.retained);
        self.owner_income += payout.owner_dividends;

        self.update_share_price();

        debug!(
            revenue,
            expenses,
            cycle_profit,
            dividends = payout.owner_dividends,
            valuation = self.valuation,
            share_price = self.share_price,
            "settled market cycle"
        );
    }

    /// Sum of division revenue and expenses, skipping any division that
    /// reports an infinite value for either.
    fn aggregate_division_results(&self) -> (f64, f64) {
        let mut revenue = 0.0;
        let mut expenses = 0.0;
        for (name, division) in &self.divisions {
            let r = division.last_cycle_revenue();
            let e = division.last_cycle_expenses();
            if r.is_infinite() || e.is_infinite() {
                error!(division = %name, revenue = r, expenses = e, "skipping division with infinite results");
                continue;
            }
            revenue += r;
            expenses += e;
        }
        (revenue, expenses)
    }

    /// Dividends the player would receive at the next settlement at current figures.
    pub fn estimated_dividend_payout(&self) -> f64 {
        let seconds = self.config.seconds_per_market_cycle;
        let payout = settle_profit(
            cycle_profit(self.revenue, self.expenses, seconds),
            self.dividend_rate,
            self.config.dividend_max_rate,
            self.dividend_tax,
            self.num_shares,
            self.total_shares,
        );
        payout.owner_dividends
    }
}
