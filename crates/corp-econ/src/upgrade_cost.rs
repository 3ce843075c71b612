//! Geometric-series pricing of levelable upgrades.

/// Largest purchase the search will consider.
const MAX_SEARCH_AMOUNT: u64 = 1 << 52;

/// Total price of buying `amount` levels starting from `level`.
///
/// `base_price * price_mult^level * (1 - price_mult^amount) / (1 - price_mult)`,
/// evaluated in closed form. A multiplier of exactly 1 degenerates to
/// `base_price * amount`.
///
/// Example:
/// assert_eq!(upgrade_cost(0, 1.06, 2e9, 1), 2e9);
pub fn upgrade_cost(level: u32, price_mult: f64, base_price: f64, amount: u64) -> f64 {
    if amount == 0 {
        return 0.0;
    }
    let start = base_price * price_mult.powf(level as f64);
    if price_mult == 1.0 {
        return start * amount as f64;
    }
    // Ratio first so a single level costs exactly `start`.
    let series = (1.0 - price_mult.powf(amount as f64)) / (1.0 - price_mult);
    start * series
}

/// Largest number of levels purchasable with `funds`, starting at `level`.
///
/// Doubles an upper bound until it becomes unaffordable, then binary-searches
/// the boundary against [`upgrade_cost`]. Returns 0 for non-positive or
/// non-finite funds and for invalid price parameters.
pub fn max_affordable(funds: f64, level: u32, price_mult: f64, base_price: f64) -> u64 {
    if !(funds.is_finite() && funds > 0.0) {
        return 0;
    }
    if !(base_price.is_finite() && base_price > 0.0 && price_mult.is_finite() && price_mult > 0.0)
    {
        return 0;
    }
    let affordable = |n: u64| upgrade_cost(level, price_mult, base_price, n) <= funds;
    if !affordable(1) {
        return 0;
    }

    // Invariant: affordable(lo) && (hi == lo || !affordable(hi)).
    let mut lo = 1u64;
    let mut hi = 2u64;
    while affordable(hi) {
        lo = hi;
        if hi >= MAX_SEARCH_AMOUNT {
            return lo;
        }
        hi = hi.saturating_mul(2);
    }
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if affordable(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Closed-form inverse of [`upgrade_cost`]:
/// `floor(ln(1 - funds / (base_price * price_mult^level) * (1 - price_mult)) / ln(price_mult))`.
///
/// Loses precision as `price_mult` approaches 1; [`max_affordable`] is the
/// production path and this stays as a cross-check.
pub fn max_affordable_closed_form(funds: f64, level: u32, price_mult: f64, base_price: f64) -> u64 {
    if !(funds > 0.0) || price_mult == 1.0 {
        return 0;
    }
    let start = base_price * price_mult.powf(level as f64);
    let arg = 1.0 - funds / start * (1.0 - price_mult);
    if !(arg > 0.0) {
        return 0;
    }
    let x = (arg.ln() / price_mult.ln()).floor();
    if x.is_nan() || x < 0.0 {
        0
    } else {
        x as u64
    }
}
