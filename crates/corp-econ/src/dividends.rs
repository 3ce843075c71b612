//! Dividend payout and the retained-earnings split.

use tracing::warn;

/// Outcome of distributing one settlement's profit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Payout {
    /// Paid to the player after dividend tax.
    pub owner_dividends: f64,
    /// Added to corporation funds.
    pub retained: f64,
}

/// Profit booked for one settlement: per-second profit times the cycle length.
pub fn cycle_profit(revenue: f64, expenses: f64, seconds_per_market_cycle: f64) -> f64 {
    (revenue - expenses) * seconds_per_market_cycle
}

/// Dividends reaching the player for one settlement.
///
/// `raw = num_shares * (dividend_rate * cycle_profit / total_shares)` and the
/// payout is `raw^(1 - dividend_tax)`. A non-positive or non-finite `raw`
/// pays nothing, since a fractional power of a negative number is undefined.
pub fn owner_dividends(
    cycle_profit: f64,
    dividend_rate: f64,
    dividend_tax: f64,
    num_shares: u64,
    total_shares: u64,
) -> f64 {
    let total_dividends = dividend_rate * cycle_profit;
    let per_share = total_dividends / total_shares as f64;
    let raw = num_shares as f64 * per_share;
    if !(raw.is_finite() && raw > 0.0) {
        return 0.0;
    }
    raw.powf(1.0 - dividend_tax)
}

/// Split a settlement's profit between dividends and retained earnings.
///
/// Dividends are paid only for a positive profit and a positive rate. A rate
/// that is NaN, negative or above `max_rate` is rejected and the whole profit
/// is retained.
pub fn settle_profit(
    cycle_profit: f64,
    dividend_rate: f64,
    max_rate: f64,
    dividend_tax: f64,
    num_shares: u64,
    total_shares: u64,
) -> Payout {
    let retain_all = Payout {
        owner_dividends: 0.0,
        retained: cycle_profit,
    };
    if dividend_rate.is_nan() || dividend_rate < 0.0 || dividend_rate > max_rate {
        warn!(dividend_rate, max_rate, "invalid dividend rate; retaining all profit");
        return retain_all;
    }
    if !(dividend_rate > 0.0 && cycle_profit > 0.0) {
        return retain_all;
    }
    let total_dividends = dividend_rate * cycle_profit;
    Payout {
        owner_dividends: owner_dividends(
            cycle_profit,
            dividend_rate,
            dividend_tax,
            num_shares,
            total_shares,
        ),
        retained: cycle_profit - total_dividends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn payout_applies_sublinear_tax() {
        // 1e6 profit, half paid out, player holds everything.
        let d = owner_dividends(1e6, 0.5, 0.15, 1_000, 1_000);
        assert!((d - 5e5f64.powf(0.85)).abs() < 1e-6);
        assert!(d < 5e5);
    }

    #[test]
    fn zero_tax_is_proportional() {
        let d = owner_dividends(1e6, 0.1, 0.0, 250, 1_000);
        assert!((d - 25_000.0).abs() < 1e-9);
    }

    #[test]
    fn negative_raw_dividend_pays_nothing() {
        let d = owner_dividends(-1e6, 0.5, 0.15, 1_000, 1_000);
        assert_eq!(d, 0.0);
        // Unguarded, the power would be NaN.
        assert!((-5e5f64).powf(0.85).is_nan());
    }

    #[test]
    fn no_shares_outstanding_pays_nothing() {
        assert_eq!(owner_dividends(1e6, 0.5, 0.15, 0, 0), 0.0);
    }

    #[test]
    fn loss_is_retained_in_full() {
        let p = settle_profit(-300.0, 0.5, 1.0, 0.15, 10, 10);
        assert_eq!(p, Payout { owner_dividends: 0.0, retained: -300.0 });
    }

    #[test]
    fn zero_rate_retains_everything() {
        let p = settle_profit(1e9, 0.0, 1.0, 0.15, 10, 10);
        assert_eq!(p.retained, 1e9);
        assert_eq!(p.owner_dividends, 0.0);
    }

    #[test]
    fn out_of_range_rate_falls_back_to_retain_all() {
        for rate in [f64::NAN, -0.1, 1.5] {
            let p = settle_profit(1e9, rate, 1.0, 0.15, 10, 10);
            assert_eq!(p.retained, 1e9);
            assert_eq!(p.owner_dividends, 0.0);
        }
    }

    #[test]
    fn positive_rate_splits_profit() {
        let p = settle_profit(1e9, 0.25, 1.0, 0.15, 500, 1_000);
        assert!((p.retained - 7.5e8).abs() < 1e-3);
        assert!((p.owner_dividends - 1.25e8f64.powf(0.85)).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn payout_never_nan(profit in -1e15f64..1e15, rate in 0.0f64..=1.0, tax in 0.0f64..1.0,
                            held in 0u64..1_000_000_000, extra in 0u64..1_000_000_000) {
            let p = settle_profit(profit, rate, 1.0, tax, held, held + extra);
            prop_assert!(!p.owner_dividends.is_nan());
            prop_assert!(p.owner_dividends >= 0.0);
            prop_assert!(!p.retained.is_nan());
        }
    }
}
