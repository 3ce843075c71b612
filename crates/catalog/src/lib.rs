#![deny(warnings)]

//! Upgrade and unlock tables loaded from YAML.
//!
//! The built-in table ships with the crate; [`Catalog::load`] reads an
//! override file with the same layout.

use corp_core::{UnlockId, UnlockInfo, UpgradeId, UpgradeInfo};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const DEFAULT_CATALOG: &str = include_str!("../data/catalog.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("duplicate entry: {0}")]
    Duplicate(String),
    #[error("invalid entry {id}: {reason}")]
    Invalid { id: String, reason: String },
}

/// Every purchasable upgrade and unlock.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub upgrades: Vec<UpgradeInfo>,
    #[serde(default)]
    pub unlocks: Vec<UnlockInfo>,
}

impl Catalog {
    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let catalog = Self::from_yaml_str(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            upgrades = catalog.upgrades.len(),
            unlocks = catalog.unlocks.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// The built-in table.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(DEFAULT_CATALOG)
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeInfo> {
        self.upgrades.iter().find(|u| u.id.0 == id)
    }

    pub fn unlock(&self, id: &str) -> Option<&UnlockInfo> {
        self.unlocks.iter().find(|u| u.id.0 == id)
    }

    pub fn upgrade_ids(&self) -> impl Iterator<Item = &UpgradeId> {
        self.upgrades.iter().map(|u| &u.id)
    }

    pub fn unlock_ids(&self) -> impl Iterator<Item = &UnlockId> {
        self.unlocks.iter().map(|u| &u.id)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for u in &self.upgrades {
            if !seen.insert(u.id.0.as_str()) {
                return Err(CatalogError::Duplicate(u.id.0.clone()));
            }
            if !(u.base_price.is_finite() && u.base_price > 0.0) {
                return Err(invalid(&u.id.0, "base_price must be positive"));
            }
            if !(u.price_mult.is_finite() && u.price_mult >= 1.0) {
                return Err(invalid(&u.id.0, "price_mult must be at least 1"));
            }
            if !u.benefit.is_finite() {
                return Err(invalid(&u.id.0, "benefit must be finite"));
            }
        }
        seen.clear();
        for u in &self.unlocks {
            if !seen.insert(u.id.0.as_str()) {
                return Err(CatalogError::Duplicate(u.id.0.clone()));
            }
            if !(u.price.is_finite() && u.price >= 0.0) {
                return Err(invalid(&u.id.0, "price must be non-negative"));
            }
            if !(0.0..1.0).contains(&u.dividend_tax_reduction) {
                return Err(invalid(&u.id.0, "dividend_tax_reduction out of range"));
            }
        }
        Ok(())
    }
}

fn invalid(id: &str, reason: &str) -> CatalogError {
    CatalogError::Invalid {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
