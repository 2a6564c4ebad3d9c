use crate::core::currency::PinnedRates;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Asset => write!(f, "Asset"),
            AccountType::Liability => write!(f, "Liability"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default = "default_category")]
    pub category: String,
    pub currency: String,
}

fn default_category() -> String {
    "other".to_string()
}

/// A saved snapshot of balances for one calendar date.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthEntry {
    pub id: String,
    pub date: NaiveDate,
    pub account_values: BTreeMap<String, f64>,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rates: Option<PinnedRates>,
}

impl NetWorthEntry {
    pub fn id_for(date: NaiveDate) -> String {
        format!("entry-{}", date.format("%Y-%m-%d"))
    }

    /// Fails when a balance or total is not a finite number. JSON has no
    /// representation for those, so such an entry cannot be stored.
    pub fn ensure_finite(&self) -> Result<()> {
        for (id, value) in &self.account_values {
            if !value.is_finite() {
                bail!("Balance for {id} on {} is not a finite number", self.date);
            }
        }
        for (label, value) in [
            ("Total assets", self.total_assets),
            ("Total liabilities", self.total_liabilities),
            ("Net worth", self.net_worth),
        ] {
            if !value.is_finite() {
                bail!("{label} on {} is out of range ({value})", self.date);
            }
        }
        Ok(())
    }
}
