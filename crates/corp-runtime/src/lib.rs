#![deny(warnings)]

//! Cycle engine for the player corporation.
//!
//! [`Corporation`] owns the money, equity, valuation and upgrade state and
//! advances it one phase per `process()` call once enough game cycles have
//! been stored. Divisions are supplied by the host through the
//! [`corp_core::Division`] trait.

mod corporation;
mod cycle;
mod equity;
mod flat_division;
mod funds_serde;
mod purchases;

pub use corporation::Corporation;
pub use equity::IssueOutcome;
pub use flat_division::FlatDivision;

pub use corp_core::{
    CorpContext, CorpNotice, CorpState, Division, EngineConfig, TransactionError, UnlockId,
    UnlockInfo, UpgradeId, UpgradeInfo, UpgradeLevel,
};
pub use corp_econ::{FundingOffer, ShareSale};
