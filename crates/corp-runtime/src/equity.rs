//! Share price, dividends and every operation that moves shares.

use crate::Corporation;
use corp_core::{format_game_cycles, TransactionError};
use corp_econ::{
    funding_offer, max_new_shares, simulate_share_sale, step_share_price, target_share_price,
    FundingOffer, SaleMarket, ShareSale,
};
use rand::Rng;
use tracing::{info, warn};

/// Result of issuing new shares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IssueOutcome {
    /// Funds raised by the issue.
    pub proceeds: f64,
    /// Shares issued after rounding to the issue granularity.
    pub shares: u64,
    /// Portion bought by existing private investors.
    pub private_shares: u64,
}

impl<D> Corporation<D> {
    /// Price implied by the smoothed valuation and the current share float.
    pub fn target_share_price(&self) -> f64 {
        target_share_price(self.valuation, self.total_shares, self.num_shares)
    }

    /// One random drift step toward the target price.
    pub fn update_share_price(&mut self) {
        let target = self.target_share_price();
        self.share_price = step_share_price(self.share_price, target, &mut self.rng);
    }

    /// Snap the share price to its target.
    pub fn immediately_update_share_price(&mut self) {
        self.share_price = self.target_share_price();
    }

    fn sale_market(&self) -> SaleMarket {
        SaleMarket {
            valuation: self.valuation,
            total_shares: self.total_shares,
            owned_shares: self.num_shares,
            share_price: self.share_price,
            shares_until_update: self.share_sales_until_price_update,
            shares_per_update: self.config.shares_per_price_update,
            max_iterations: self.config.max_share_sale_iterations,
        }
    }

    /// Preview selling `num_shares` without changing any state.
    pub fn calculate_share_sale(&self, num_shares: u64) -> ShareSale {
        simulate_share_sale(&self.sale_market(), num_shares)
    }

    /// Most new shares one issue may create.
    pub fn calculate_max_new_shares(&self) -> u64 {
        max_new_shares(self.total_shares, self.config.new_share_granularity)
    }

    /// Set the fraction of profit paid out as dividends.
    pub fn set_dividend_rate(&mut self, rate: f64) -> Result<(), TransactionError> {
        let max = self.config.dividend_max_rate;
        if rate.is_nan() || rate < 0.0 || rate > max {
            warn!(rate, max, "rejected dividend rate");
            return Err(TransactionError::InvalidDividendRate { rate, max });
        }
        self.dividend_rate = rate;
        info!(rate, "dividend rate set");
        Ok(())
    }

    /// Offer for the next private funding round, if one remains.
    pub fn investment_offer(&self) -> Option<FundingOffer> {
        if self.public {
            return None;
        }
        let round = self.config.funding_rounds.get(self.funding_round as usize)?;
        Some(funding_offer(
            self.valuation,
            round,
            self.funding_round,
            self.config.initial_shares,
        ))
    }

    /// Sell a slice of the player's shares to private investors.
    pub fn accept_investment_offer(&mut self) -> Result<FundingOffer, TransactionError> {
        let offer = self
            .investment_offer()
            .ok_or(TransactionError::NoInvestmentOffer)?;
        if offer.shares > self.num_shares {
            return Err(TransactionError::NotEnoughShares {
                requested: offer.shares,
                available: self.num_shares,
            });
        }
        self.funding_round += 1;
        self.add_funds(offer.funds);
        self.num_shares -= offer.shares;
        self.investor_shares += offer.shares;
        self.immediately_update_share_price();
        debug_assert!(self.shares_balanced());
        info!(round = offer.round, funds = offer.funds, shares = offer.shares, "accepted investment");
        Ok(offer)
    }

    /// List the corporation, issuing `num_shares` of the player's shares to the market.
    ///
    /// Returns the funds raised.
    pub fn go_public(&mut self, num_shares: u64) -> Result<f64, TransactionError> {
        if self.public {
            return Err(TransactionError::AlreadyPublic);
        }
        if num_shares > self.num_shares {
            return Err(TransactionError::NotEnoughShares {
                requested: num_shares,
                available: self.num_shares,
            });
        }
        let initial_price = self.valuation / self.total_shares as f64;
        let proceeds = num_shares as f64 * initial_price;
        self.public = true;
        self.num_shares -= num_shares;
        self.issued_shares += num_shares;
        self.add_funds(proceeds);
        self.immediately_update_share_price();
        debug_assert!(self.shares_balanced());
        info!(num_shares, initial_price, "went public");
        Ok(proceeds)
    }

    /// Issue new shares to the market. `amount` is rounded to the issue granularity.
    pub fn issue_new_shares(&mut self, amount: u64) -> Result<IssueOutcome, TransactionError> {
        if !self.public {
            return Err(TransactionError::NotPublic);
        }
        if self.issue_new_shares_cooldown > 0 {
            return Err(TransactionError::OnCooldown(
                self.issue_new_shares_cooldown_remaining(),
            ));
        }
        let granularity = self.config.new_share_granularity;
        let shares = (amount.saturating_add(granularity / 2) / granularity) * granularity;
        let max = self.calculate_max_new_shares();
        if shares < granularity || shares > max {
            return Err(TransactionError::InvalidAmount(format!(
                "must issue between {granularity} and {max} shares (20% of total shares)"
            )));
        }

        let proceeds = shares as f64 * self.share_price * self.config.new_share_discount;
        let cooldown_mult = self.total_shares as f64 / self.config.initial_shares as f64;
        self.issue_new_shares_cooldown =
            (self.config.issue_new_shares_cooldown as f64 * cooldown_mult) as i64;

        let private_ratio = self.investor_shares as f64 / self.total_shares as f64;
        let max_private = (shares as f64 / 2.0 * private_ratio).round() as u64;
        let drawn = self.rng.gen_range(0..=max_private);
        let private_shares =
            ((drawn as f64 / granularity as f64).round() as u64 * granularity).min(shares);

        self.issued_shares += shares - private_shares;
        self.investor_shares += private_shares;
        self.total_shares += shares;
        self.add_funds(proceeds);
        self.immediately_update_share_price();
        debug_assert!(self.shares_balanced());
        info!(shares, private_shares, proceeds, "issued new shares");
        Ok(IssueOutcome {
            proceeds,
            shares,
            private_shares,
        })
    }

    /// Buy back `num_shares` issued shares with the player's money at a premium.
    ///
    /// Returns the price paid, which is debited from the owner income.
    pub fn buy_back_shares(
        &mut self,
        num_shares: u64,
        owner_funds: f64,
    ) -> Result<f64, TransactionError> {
        if num_shares == 0 {
            return Err(TransactionError::InvalidAmount(
                "must buy back at least one share".into(),
            ));
        }
        if num_shares > self.issued_shares {
            return Err(TransactionError::NotEnoughShares {
                requested: num_shares,
                available: self.issued_shares,
            });
        }
        if !self.public {
            return Err(TransactionError::NotPublic);
        }
        let cost = num_shares as f64 * self.share_price * self.config.buyback_premium;
        if !(owner_funds >= cost) {
            return Err(TransactionError::InsufficientFunds {
                needed: cost,
                available: owner_funds,
            });
        }
        self.num_shares += num_shares;
        self.issued_shares -= num_shares;
        self.owner_income -= cost;
        self.immediately_update_share_price();
        debug_assert!(self.shares_balanced());
        info!(num_shares, cost, "bought back shares");
        Ok(cost)
    }

    /// Sell `num_shares` of the player's shares on the market.
    ///
    /// Returns the proceeds, which are also credited to the owner income.
    pub fn sell_shares(&mut self, num_shares: u64) -> Result<f64, TransactionError> {
        if num_shares == 0 {
            return Err(TransactionError::InvalidAmount(
                "must sell at least one share".into(),
            ));
        }
        if num_shares > self.num_shares {
            return Err(TransactionError::NotEnoughShares {
                requested: num_shares,
                available: self.num_shares,
            });
        }
        if !self.public {
            return Err(TransactionError::NotPublic);
        }
        if self.share_sale_cooldown > 0 {
            return Err(TransactionError::OnCooldown(format_game_cycles(
                self.share_sale_cooldown,
                self.config.milliseconds_per_game_cycle,
            )));
        }
        let market = self.sale_market();
        if !market.can_price(num_shares) {
            return Err(TransactionError::InvalidAmount(format!(
                "{num_shares} shares is too large a sale to price"
            )));
        }
        let sale = simulate_share_sale(&market, num_shares);
        self.share_price = sale.share_price;
        self.share_sales_until_price_update = sale.shares_until_update;
        self.num_shares -= num_shares;
        self.issued_shares += num_shares;
        self.owner_income += sale.proceeds;
        self.share_sale_cooldown = self.config.sell_shares_cooldown;
        debug_assert!(self.shares_balanced());
        info!(num_shares, proceeds = sale.proceeds, "sold shares");
        Ok(sale.proceeds)
    }
}
