//! Currency conversion abstractions

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Normalizes a currency code to its canonical upper-case form.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// An ordered source/target currency pair, written as `FROM-TO`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyPair {
    from: String,
    to: String,
}

impl CurrencyPair {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: normalize_code(from),
            to: normalize_code(to),
        }
    }

    pub fn base(&self) -> &str {
        &self.from
    }

    pub fn quote(&self) -> &str {
        &self.to
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
                Ok(CurrencyPair::new(from, to))
            }
            _ => Err(anyhow!("Invalid currency pair: {}", s)),
        }
    }
}

impl Serialize for CurrencyPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CurrencyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// True for rates that may be multiplied into an amount.
pub fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// Exchange rates stored alongside a saved entry so that re-valuing it later
/// reproduces the same totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinnedRates(BTreeMap<CurrencyPair, f64>);

impl PinnedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pinned rate for `pair` if it is positive and finite.
    pub fn get(&self, pair: &CurrencyPair) -> Option<f64> {
        let rate = *self.0.get(pair)?;
        if is_usable_rate(rate) {
            Some(rate)
        } else {
            debug!(%pair, rate, "Ignoring invalid pinned rate");
            None
        }
    }

    /// Pins `rate` for `pair`. Identity pairs and unusable rates are ignored.
    pub fn insert(&mut self, pair: CurrencyPair, rate: f64) -> bool {
        if pair.is_identity() || !is_usable_rate(rate) {
            return false;
        }
        self.0.insert(pair, rate);
        true
    }

    /// Copies every entry of `other` that is not already pinned here.
    pub fn merge_missing(&mut self, other: &PinnedRates) {
        for (pair, rate) in other.iter() {
            if self.get(pair).is_none() {
                self.insert(pair.clone(), rate);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyPair, f64)> {
        self.0.iter().map(|(pair, rate)| (pair, *rate))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CurrencyPair, f64)> for PinnedRates {
    /// Raw collection; values are not validated so that stored maps round-trip as-is.
    fn from_iter<I: IntoIterator<Item = (CurrencyPair, f64)>>(iter: I) -> Self {
        PinnedRates(iter.into_iter().collect())
    }
}

/// Which quote a provider should serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDate {
    Latest,
    On(NaiveDate),
}

impl Display for RateDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateDate::Latest => write!(f, "latest"),
            RateDate::On(date) => write!(f, "{date}"),
        }
    }
}

/// Where the rate behind a conversion came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateOrigin {
    Identity,
    Pinned,
    Cached,
    Fetched(String),
    /// No real rate was available; the amount was passed through 1:1.
    Unconverted,
}

impl Display for RateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateOrigin::Identity => write!(f, "identity"),
            RateOrigin::Pinned => write!(f, "pinned"),
            RateOrigin::Cached => write!(f, "cached"),
            RateOrigin::Fetched(source) => write!(f, "{source}"),
            RateOrigin::Unconverted => write!(f, "unconverted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub rate: f64,
    pub origin: RateOrigin,
}

impl RateQuote {
    pub fn identity() -> Self {
        Self {
            rate: 1.0,
            origin: RateOrigin::Identity,
        }
    }

    pub fn unconverted() -> Self {
        Self {
            rate: 1.0,
            origin: RateOrigin::Unconverted,
        }
    }
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, pair: &CurrencyPair, date: RateDate) -> Result<f64>;

    fn name(&self) -> &str;

    /// Whether this provider can quote `pair` at all.
    fn supports(&self, _pair: &CurrencyPair) -> bool {
        true
    }
}
