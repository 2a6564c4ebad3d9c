//! Values a balance snapshot in the preferred currency.
use crate::core::convert::{Conversion, Converter};
use crate::core::currency::{CurrencyPair, PinnedRates, RateQuote, normalize_code};
use crate::core::model::{Account, AccountType, NetWorthEntry};
use anyhow::Result;
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntryTotals {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

/// One account's contribution to a valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountValuation {
    pub account_id: String,
    pub name: String,
    pub account_type: AccountType,
    pub category: String,
    pub currency: String,
    pub balance: f64,
    pub conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryValuation {
    pub date: NaiveDate,
    pub currency: String,
    pub totals: EntryTotals,
    pub accounts: Vec<AccountValuation>,
    /// Input pins plus every rate obtained from the cache or a provider.
    pub rates: PinnedRates,
}

impl EntryValuation {
    /// Accounts whose balance could not be converted and was counted 1:1.
    pub fn unconverted(&self) -> impl Iterator<Item = &AccountValuation> {
        self.accounts
            .iter()
            .filter(|line| line.conversion.is_unconverted())
    }

    pub fn is_fully_converted(&self) -> bool {
        self.unconverted().next().is_none()
    }
}

/// Converts every account's balance (0 when absent) into `preferred` and sums
/// assets and liabilities.
///
/// Each distinct currency pair is resolved once and its rate applied to every
/// account in that currency, so the captured rates always reproduce the
/// totals. Lookups run concurrently but sums follow account order, so
/// identical inputs, including `pinned`, always produce identical totals.
pub async fn value_entry(
    converter: &Converter,
    accounts: &[Account],
    balances: &BTreeMap<String, f64>,
    preferred: &str,
    date: NaiveDate,
    pinned: Option<&PinnedRates>,
) -> EntryValuation {
    let preferred = normalize_code(preferred);

    let pairs: BTreeSet<CurrencyPair> = accounts
        .iter()
        .map(|account| CurrencyPair::new(&account.currency, &preferred))
        .collect();
    let lookups = pairs.into_iter().map(|pair| async move {
        let quote = converter.rate_with_pin(&pair, date, pinned).await;
        (pair, quote)
    });
    let quotes: HashMap<CurrencyPair, RateQuote> = join_all(lookups).await.into_iter().collect();

    let mut totals = EntryTotals::default();
    let mut rates = pinned.cloned().unwrap_or_default();
    let mut lines = Vec::with_capacity(accounts.len());
    for account in accounts {
        let balance = balances.get(&account.id).copied().unwrap_or(0.0);
        let pair = CurrencyPair::new(&account.currency, &preferred);
        let quote = quotes
            .get(&pair)
            .cloned()
            .unwrap_or_else(RateQuote::unconverted);
        let conversion = Conversion::apply(balance, quote);

        match account.account_type {
            AccountType::Asset => totals.total_assets += conversion.value,
            AccountType::Liability => totals.total_liabilities += conversion.value,
        }
        if conversion.is_pinnable() {
            rates.insert(pair.clone(), conversion.rate);
        }
        if conversion.is_unconverted() {
            warn!(
                account = %account.id,
                "Balance in {} counted unconverted in {}", pair.base(), preferred
            );
        }
        lines.push(AccountValuation {
            account_id: account.id.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            category: account.category.clone(),
            currency: pair.base().to_string(),
            balance,
            conversion,
        });
    }
    totals.net_worth = totals.total_assets - totals.total_liabilities;
    debug!(?totals, %date, "Valued entry");

    EntryValuation {
        date,
        currency: preferred,
        totals,
        accounts: lines,
        rates,
    }
}

/// Builds the entry to save for `date`.
///
/// When an entry for that date already exists, its balances are the starting
/// point and its pinned rates are reused, so changing one account does not move
/// the rate applied to the others. Fails when a total overflows.
pub async fn build_entry(
    converter: &Converter,
    accounts: &[Account],
    balances: &BTreeMap<String, f64>,
    preferred: &str,
    date: NaiveDate,
    existing: Option<&NetWorthEntry>,
) -> Result<(NetWorthEntry, EntryValuation)> {
    let mut account_values = existing
        .map(|entry| entry.account_values.clone())
        .unwrap_or_default();
    account_values.extend(balances.iter().map(|(id, value)| (id.clone(), *value)));

    let pinned = existing.and_then(|entry| entry.exchange_rates.as_ref());
    let valuation = value_entry(
        converter,
        accounts,
        &account_values,
        preferred,
        date,
        pinned,
    )
    .await;

    let entry = NetWorthEntry {
        id: existing
            .map(|entry| entry.id.clone())
            .unwrap_or_else(|| NetWorthEntry::id_for(date)),
        date,
        account_values,
        total_assets: valuation.totals.total_assets,
        total_liabilities: valuation.totals.total_liabilities,
        net_worth: valuation.totals.net_worth,
        exchange_rates: (!valuation.rates.is_empty()).then(|| valuation.rates.clone()),
    };
    entry.ensure_finite()?;
    Ok((entry, valuation))
}

/// Recomputes a saved entry with its own pinned rates.
pub async fn revalue_entry(
    converter: &Converter,
    accounts: &[Account],
    entry: &NetWorthEntry,
    preferred: &str,
) -> EntryValuation {
    for id in entry.account_values.keys() {
        if !accounts.iter().any(|account| &account.id == id) {
            warn!(account = %id, date = %entry.date, "Entry references an unknown account");
        }
    }
    value_entry(
        converter,
        accounts,
        &entry.account_values,
        preferred,
        entry.date,
        entry.exchange_rates.as_ref(),
    )
    .await
}
