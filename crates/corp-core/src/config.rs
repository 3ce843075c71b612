//! Engine constants and balance multipliers.
//!
//! Nothing in the engine reads global state: every constant the formulas need
//! travels through [`EngineConfig`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global balance multipliers supplied by the host game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BalanceMultipliers {
    /// Scales every per-cycle valuation.
    pub valuation: f64,
    /// Dividend softcap; lowering it raises the starting dividend tax.
    pub softcap: f64,
}

impl Default for BalanceMultipliers {
    fn default() -> Self {
        Self {
            valuation: 1.0,
            softcap: 1.0,
        }
    }
}

/// One private funding round: investors take `share_fraction` of the initial
/// shares and pay `valuation * share_fraction * multiplier`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FundingRound {
    pub share_fraction: f64,
    pub multiplier: f64,
}

/// Engine configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Game cycles consumed by one call to `process()` that advances the state.
    pub cycles_per_market_cycle: u64,
    /// Seconds of profit booked per settlement.
    pub seconds_per_market_cycle: f64,
    /// Wall-clock length of one game cycle, used for cooldown display.
    pub milliseconds_per_game_cycle: u64,
    /// Number of per-cycle valuations averaged into the smoothed valuation.
    pub valuation_window: usize,
    /// Block size of the share-sale simulation.
    pub shares_per_price_update: u64,
    /// Hard cap on share-sale simulation iterations.
    pub max_share_sale_iterations: u64,
    /// Shares outstanding at founding.
    pub initial_shares: u64,
    /// Funds at founding.
    pub starting_funds: f64,
    /// Funds restored when the balance is found NaN or infinite.
    pub safe_funds_baseline: f64,
    /// Game cycles before shares may be sold again.
    pub sell_shares_cooldown: i64,
    /// Game cycles before new shares may be issued again, at initial share count.
    pub issue_new_shares_cooldown: i64,
    pub dividend_max_rate: f64,
    /// Dividend tax at softcap 1.0.
    pub base_dividend_tax: f64,
    /// New share issues are rounded to this granularity.
    pub new_share_granularity: u64,
    /// Buyback price relative to the share price.
    pub buyback_premium: f64,
    /// Issue price of new shares relative to the share price.
    pub new_share_discount: f64,
    pub funding_rounds: Vec<FundingRound>,
    pub multipliers: BalanceMultipliers,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycles_per_market_cycle: 10,
            seconds_per_market_cycle: 10.0,
            milliseconds_per_game_cycle: 200,
            valuation_window: 10,
            shares_per_price_update: 1_000_000,
            max_share_sale_iterations: 10_000_000,
            initial_shares: 1_000_000_000,
            starting_funds: 150e9,
            safe_funds_baseline: 150e9,
            sell_shares_cooldown: 18_000,
            issue_new_shares_cooldown: 72_000,
            dividend_max_rate: 1.0,
            base_dividend_tax: 0.15,
            new_share_granularity: 10_000_000,
            buyback_premium: 1.1,
            new_share_discount: 0.8,
            funding_rounds: vec![
                FundingRound { share_fraction: 0.10, multiplier: 3.0 },
                FundingRound { share_fraction: 0.35, multiplier: 2.0 },
                FundingRound { share_fraction: 0.25, multiplier: 2.0 },
                FundingRound { share_fraction: 0.20, multiplier: 1.5 },
            ],
            multipliers: BalanceMultipliers::default(),
        }
    }
}

/// Invalid engine configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("funding round {0} has a share fraction outside (0, 1]")]
    InvalidFundingRound(usize),
}

impl EngineConfig {
    /// Dividend tax a freshly founded corporation starts with.
    pub fn initial_dividend_tax(&self) -> f64 {
        self.base_dividend_tax + 1.0 - self.multipliers.softcap
    }

    /// Check every constant the formulas divide by or exponentiate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles_per_market_cycle == 0 {
            return Err(ConfigError::NonPositive("cycles_per_market_cycle"));
        }
        if self.valuation_window == 0 {
            return Err(ConfigError::NonPositive("valuation_window"));
        }
        if self.shares_per_price_update == 0 {
            return Err(ConfigError::NonPositive("shares_per_price_update"));
        }
        if self.new_share_granularity == 0 {
            return Err(ConfigError::NonPositive("new_share_granularity"));
        }
        if self.initial_shares == 0 {
            return Err(ConfigError::NonPositive("initial_shares"));
        }
        let finite = [
            ("seconds_per_market_cycle", self.seconds_per_market_cycle),
            ("starting_funds", self.starting_funds),
            ("safe_funds_baseline", self.safe_funds_baseline),
            ("dividend_max_rate", self.dividend_max_rate),
            ("base_dividend_tax", self.base_dividend_tax),
            ("buyback_premium", self.buyback_premium),
            ("new_share_discount", self.new_share_discount),
            ("multipliers.valuation", self.multipliers.valuation),
            ("multipliers.softcap", self.multipliers.softcap),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if self.seconds_per_market_cycle <= 0.0 {
            return Err(ConfigError::NonPositive("seconds_per_market_cycle"));
        }
        for (i, round) in self.funding_rounds.iter().enumerate() {
            if !(round.share_fraction > 0.0 && round.share_fraction <= 1.0)
                || !round.multiplier.is_finite()
            {
                return Err(ConfigError::InvalidFundingRound(i));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert!((cfg.initial_dividend_tax() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn softcap_raises_dividend_tax() {
        let cfg = EngineConfig {
            multipliers: BalanceMultipliers {
                valuation: 1.0,
                softcap: 0.9,
            },
            ..EngineConfig::default()
        };
        assert!((cfg.initial_dividend_tax() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_cycle_length_and_nan_multiplier() {
        let cfg = EngineConfig {
            cycles_per_market_cycle: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive("cycles_per_market_cycle"))
        );

        let mut cfg = EngineConfig::default();
        cfg.multipliers.valuation = f64::NAN;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonFinite("multipliers.valuation"))
        );
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"valuation_window": 4}"#).unwrap();
        assert_eq!(cfg.valuation_window, 4);
        assert_eq!(cfg.initial_shares, 1_000_000_000);
        assert_eq!(cfg.funding_rounds.len(), 4);
    }
}
