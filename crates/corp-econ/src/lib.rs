#![deny(warnings)]

//! Economic models: closed-form and iterative formulas for the corporation.
//!
//! This crate provides pure, validated utilities for:
//! - Geometric upgrade pricing and the largest affordable purchase
//! - Dividend payouts and the retained-earnings split
//! - Per-cycle valuation and its moving-average window
//! - Target share price, price drift and batch share-sale simulation
//!
//! Nothing here mutates a corporation; the cycle engine in `corp-runtime`
//! decides when each formula runs.

pub mod dividends;
pub mod share_market;
pub mod upgrade_cost;
pub mod valuation;

pub use dividends::{cycle_profit, owner_dividends, settle_profit, Payout};
pub use share_market::{
    funding_offer, max_new_shares, nudge_share_price, simulate_share_sale, step_share_price,
    target_share_price, FundingOffer, SaleMarket, ShareSale, MIN_SHARE_PRICE,
};
pub use upgrade_cost::{max_affordable, max_affordable_closed_form, upgrade_cost};
pub use valuation::{cycle_valuation, ValuationInputs, ValuationWindow};
