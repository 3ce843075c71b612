#![deny(warnings)]

//! Core domain models and invariants for the corporation engine.
//!
//! This crate defines the serializable types shared by the economic formulas,
//! the cycle engine and persistence: identifiers, catalog entries, the state
//! machine, engine configuration, the division collaborator contract and the
//! error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod division;
pub mod state;
pub mod time;

pub use config::{BalanceMultipliers, ConfigError, EngineConfig, FundingRound};
pub use division::{CorpContext, Division};
pub use state::{CorpState, StateMachine};
pub use time::format_game_cycles;

/// Unique identifier for a levelable upgrade, e.g. "Smart Factories".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UpgradeId(pub String);

/// Unique identifier for a one-time unlock, e.g. "Export".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnlockId(pub String);

impl std::fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for UnlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price and benefit table entry for a levelable upgrade.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UpgradeInfo {
    /// Upgrade identifier.
    pub id: UpgradeId,
    /// Price of the first level.
    pub base_price: f64,
    /// Geometric growth of the price per level (> 1 for every shipped upgrade).
    pub price_mult: f64,
    /// Amount added to the upgrade value per level.
    pub benefit: f64,
    /// Whether buying this upgrade changes division storage capacity.
    #[serde(default)]
    pub recomputes_storage: bool,
    /// Player-facing description.
    #[serde(default)]
    pub desc: String,
}

/// Price table entry for a one-time unlock.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnlockInfo {
    /// Unlock identifier.
    pub id: UnlockId,
    /// One-time price.
    pub price: f64,
    /// Permanent reduction applied to the dividend tax on purchase.
    #[serde(default)]
    pub dividend_tax_reduction: f64,
    /// Player-facing description.
    #[serde(default)]
    pub desc: String,
}

/// Purchased level and accumulated value of a levelable upgrade.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct UpgradeLevel {
    /// Number of purchased increments.
    pub level: u32,
    /// Multiplier: starts at 1.0 and grows by `benefit` per level.
    pub value: f64,
}

impl Default for UpgradeLevel {
    fn default() -> Self {
        Self {
            level: 0,
            value: 1.0,
        }
    }
}

/// Business-rule failures returned by corporation transactions.
///
/// The `Display` output is the human-readable message shown to the player.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransactionError {
    /// Funds do not cover the price.
    #[error("insufficient funds: need {needed:.2}, have {available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },
    /// Amount is zero, negative, non-integer or outside the allowed range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// One-time unlock has already been purchased.
    #[error("unlock already owned: {0}")]
    AlreadyOwned(UnlockId),
    /// Operation requires a public corporation.
    #[error("the corporation has not gone public")]
    NotPublic,
    /// Operation requires a private corporation.
    #[error("the corporation is already public")]
    AlreadyPublic,
    /// Operation is cooling down; payload is the formatted time remaining.
    #[error("on cooldown for another {0}")]
    OnCooldown(String),
    /// Not enough shares held for the requested operation.
    #[error("not enough shares: requested {requested}, available {available}")]
    NotEnoughShares { requested: u64, available: u64 },
    /// All funding rounds have been used, or the corporation is public.
    #[error("no investment offer is available")]
    NoInvestmentOffer,
    /// Dividend rate is NaN or outside `[0, max]`.
    #[error("dividend rate {rate} must be within [0, {max}]")]
    InvalidDividendRate { rate: f64, max: f64 },
    /// A division with this name already exists.
    #[error("a division named {0:?} already exists")]
    DuplicateDivision(String),
    /// No division with this name exists.
    #[error("no division named {0:?}")]
    UnknownDivision(String),
}

/// One-time, player-visible signals raised by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CorpNotice {
    /// Funds were NaN or infinite at settlement and were reset to `baseline`.
    FundsReset { baseline: f64 },
}

impl std::fmt::Display for CorpNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpNotice::FundsReset { baseline } => write!(
                f,
                "There was an error calculating your corporation's funds and they were reset to {baseline:.0}."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = UpgradeId("Smart Storage".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Smart Storage\"");
        let back: UnlockId = serde_json::from_str("\"Export\"").unwrap();
        assert_eq!(back, UnlockId("Export".to_string()));
    }

    #[test]
    fn upgrade_level_starts_at_unit_multiplier() {
        let lvl = UpgradeLevel::default();
        assert_eq!(lvl.level, 0);
        assert_eq!(lvl.value, 1.0);
    }

    #[test]
    fn upgrade_info_defaults_optional_fields() {
        let json = r#"{"id":"DreamSense","base_price":4e9,"price_mult":1.1,"benefit":0.001}"#;
        let info: UpgradeInfo = serde_json::from_str(json).unwrap();
        assert!(!info.recomputes_storage);
        assert!(info.desc.is_empty());
    }

    #[test]
    fn transaction_errors_read_as_sentences() {
        let e = TransactionError::AlreadyOwned(UnlockId("Export".into()));
        assert_eq!(e.to_string(), "unlock already owned: Export");
        let e = TransactionError::InsufficientFunds {
            needed: 10.0,
            available: 2.5,
        };
        assert_eq!(e.to_string(), "insufficient funds: need 10.00, have 2.50");
    }
}
