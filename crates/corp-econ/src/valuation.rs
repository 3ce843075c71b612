//! Per-cycle valuation and its moving average.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Snapshot of the corporation fields the valuation depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValuationInputs {
    pub public: bool,
    pub funds: f64,
    /// Profit per second (revenue - expenses).
    pub profit: f64,
    pub dividend_rate: f64,
    pub division_count: usize,
    /// Global balance multiplier applied to the final value.
    pub valuation_mult: f64,
}

/// Valuation of the corporation for a single market cycle.
///
/// Private: `10e9 + max(funds, 0) / 3`, plus `profit * 315e3` when profitable,
/// times `1.1^divisions`, floored to the nearest million.
/// Public: `funds + profit * 85e3` where profit is first reduced by the
/// dividend rate, times `1.1^divisions`, clamped at zero.
pub fn cycle_valuation(inputs: &ValuationInputs) -> f64 {
    let division_mult = 1.1f64.powi(inputs.division_count as i32);
    let val = if inputs.public {
        let mut profit = inputs.profit;
        if inputs.dividend_rate > 0.0 {
            profit *= 1.0 - inputs.dividend_rate;
        }
        let val = (inputs.funds + profit * 85e3) * division_mult;
        val.max(0.0)
    } else {
        let mut val = 10e9 + inputs.funds.max(0.0) / 3.0;
        if inputs.profit > 0.0 {
            val += inputs.profit * 315e3;
        }
        val *= division_mult;
        val - val % 1e6
    };
    val * inputs.valuation_mult
}

/// Fixed-length window of recent per-cycle valuations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ValuationWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl ValuationWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a valuation, evicting the oldest beyond capacity, and return the new mean.
    pub fn push(&mut self, cycle_valuation: f64) -> f64 {
        self.values.push_back(cycle_valuation);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
        self.mean()
    }

    /// Arithmetic mean of the values held; 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn private(funds: f64, profit: f64, divisions: usize) -> ValuationInputs {
        ValuationInputs {
            public: false,
            funds,
            profit,
            dividend_rate: 0.0,
            division_count: divisions,
            valuation_mult: 1.0,
        }
    }

    #[test]
    fn fresh_private_corporation_is_worth_sixty_billion() {
        assert_eq!(cycle_valuation(&private(150e9, 0.0, 0)), 60_000_000_000.0);
    }

    #[test]
    fn private_valuation_ignores_losses_and_negative_funds() {
        assert_eq!(cycle_valuation(&private(-5e9, -1e6, 0)), 10e9);
    }

    #[test]
    fn private_valuation_counts_profit_and_divisions() {
        let v = cycle_valuation(&private(0.0, 1_000.0, 2));
        let expected = (10e9 + 1_000.0 * 315e3) * 1.1 * 1.1;
        assert_eq!(v, expected - expected % 1e6);
        assert_eq!(v % 1e6, 0.0);
    }

    #[test]
    fn public_valuation_discounts_dividends_and_clamps() {
        let base = ValuationInputs {
            public: true,
            funds: 1e9,
            profit: 1e4,
            dividend_rate: 0.5,
            division_count: 0,
            valuation_mult: 1.0,
        };
        assert_eq!(cycle_valuation(&base), 1e9 + 5e3 * 85e3);
        let broke = ValuationInputs {
            funds: -1e12,
            ..base
        };
        assert_eq!(cycle_valuation(&broke), 0.0);
    }

    #[test]
    fn multiplier_scales_result() {
        let mut inputs = private(150e9, 0.0, 0);
        inputs.valuation_mult = 0.5;
        assert_eq!(cycle_valuation(&inputs), 30e9);
    }

    #[test]
    fn window_evicts_oldest() {
        let mut w = ValuationWindow::new(3);
        assert_eq!(w.mean(), 0.0);
        w.push(1.0);
        w.push(2.0);
        w.push(3.0);
        assert_eq!(w.push(10.0), 5.0);
        assert_eq!(w.values().collect::<Vec<_>>(), vec![2.0, 3.0, 10.0]);
        assert_eq!(w.len(), 3);
    }

    proptest! {
        #[test]
        fn window_never_exceeds_capacity(cap in 1usize..20, vals in proptest::collection::vec(0.0f64..1e12, 0..60)) {
            let mut w = ValuationWindow::new(cap);
            for v in &vals {
                w.push(*v);
                prop_assert!(w.len() <= cap);
            }
        }
    }
}
