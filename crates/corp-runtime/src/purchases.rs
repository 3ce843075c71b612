//! One-time unlocks and levelable upgrades.

use crate::Corporation;
use corp_core::{Division, TransactionError, UnlockInfo, UpgradeInfo};
use corp_econ::{max_affordable, upgrade_cost};
use tracing::info;

impl<D: Division> Corporation<D> {
    /// Buy a one-time unlock and apply its permanent effect.
    pub fn purchase_unlock(&mut self, unlock: &UnlockInfo) -> Result<(), TransactionError> {
        if self.unlocks.contains(&unlock.id) {
            return Err(TransactionError::AlreadyOwned(unlock.id.clone()));
        }
        if !(self.funds >= unlock.price) {
            return Err(TransactionError::InsufficientFunds {
                needed: unlock.price,
                available: self.funds,
            });
        }
        self.funds -= unlock.price;
        self.unlocks.insert(unlock.id.clone());
        self.dividend_tax -= unlock.dividend_tax_reduction;
        info!(unlock = %unlock.id, price = unlock.price, "purchased unlock");
        Ok(())
    }

    /// Price of the next `amount` levels of `upgrade`.
    pub fn upgrade_cost(&self, upgrade: &UpgradeInfo, amount: u64) -> f64 {
        upgrade_cost(
            self.upgrade_level(&upgrade.id),
            upgrade.price_mult,
            upgrade.base_price,
            amount,
        )
    }

    /// Most levels of `upgrade` the current funds can pay for.
    pub fn max_affordable_upgrades(&self, upgrade: &UpgradeInfo) -> u64 {
        max_affordable(
            self.funds,
            self.upgrade_level(&upgrade.id),
            upgrade.price_mult,
            upgrade.base_price,
        )
    }

    /// Buy `amount` levels of `upgrade`.
    ///
    /// Storage-affecting upgrades make every division recompute its capacity.
    pub fn purchase_upgrade(
        &mut self,
        upgrade: &UpgradeInfo,
        amount: u64,
    ) -> Result<(), TransactionError> {
        if amount == 0 {
            return Err(TransactionError::InvalidAmount(
                "must buy at least one level".into(),
            ));
        }
        let level = self.upgrade_level(&upgrade.id);
        let new_level = u32::try_from(amount)
            .ok()
            .and_then(|a| level.checked_add(a))
            .ok_or_else(|| {
                TransactionError::InvalidAmount(format!("{amount} levels exceeds the level cap"))
            })?;
        let cost = self.upgrade_cost(upgrade, amount);
        if !(self.funds >= cost) {
            return Err(TransactionError::InsufficientFunds {
                needed: cost,
                available: self.funds,
            });
        }

        self.funds -= cost;
        let entry = self.upgrades.entry(upgrade.id.clone()).or_default();
        entry.level = new_level;
        entry.value += upgrade.benefit * amount as f64;
        info!(upgrade = %upgrade.id, amount, cost, level = new_level, "purchased upgrade");

        if upgrade.recomputes_storage {
            let (ctx, divisions) = self.split_divisions();
            for division in divisions.values_mut() {
                division.recompute_storage(&ctx);
            }
        }
        Ok(())
    }
}
