//! Amount conversion entry points layered on the rate cache and provider chain.

use crate::core::cache::RateCache;
use crate::core::chain::RateSourceChain;
use crate::core::clock::Clock;
use crate::core::currency::{CurrencyPair, PinnedRates, RateOrigin, RateQuote};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of converting an amount, including where the rate came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub value: f64,
    pub rate: f64,
    pub origin: RateOrigin,
}

impl Conversion {
    pub(crate) fn apply(amount: f64, quote: RateQuote) -> Self {
        Self {
            value: amount * quote.rate,
            rate: quote.rate,
            origin: quote.origin,
        }
    }

    fn identity(amount: f64) -> Self {
        Self::apply(amount, RateQuote::identity())
    }

    /// True when no real rate was available and `value` is the input amount.
    pub fn is_unconverted(&self) -> bool {
        self.origin == RateOrigin::Unconverted
    }

    /// True when the rate should be pinned on an entry that used it.
    pub fn is_pinnable(&self) -> bool {
        matches!(self.origin, RateOrigin::Cached | RateOrigin::Fetched(_))
    }
}

pub struct Converter {
    chain: RateSourceChain,
}

impl Converter {
    pub fn new(chain: RateSourceChain) -> Self {
        Self { chain }
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        self.chain.cache()
    }

    pub fn today(&self) -> NaiveDate {
        self.chain.clock().today()
    }

    /// Converts using the provider chain. Never fails: when every provider is
    /// down the result is the unchanged amount flagged as unconverted.
    pub async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> Conversion {
        let pair = CurrencyPair::new(from, to);
        if pair.is_identity() {
            return Conversion::identity(amount);
        }
        let date = date.unwrap_or_else(|| self.today());
        let quote = self.chain.fetch_rate(&pair, date).await;
        Conversion::apply(amount, quote)
    }

    /// Converts using only a cached rate for today, without touching the network.
    pub fn convert_sync(&self, amount: f64, from: &str, to: &str) -> Conversion {
        let pair = CurrencyPair::new(from, to);
        if pair.is_identity() {
            return Conversion::identity(amount);
        }
        match self.cache().peek(&pair, self.today()) {
            Some(rate) => Conversion::apply(
                amount,
                RateQuote {
                    rate,
                    origin: RateOrigin::Cached,
                },
            ),
            None => {
                warn!("No cached rate for {}; amount left unconverted", pair);
                Conversion::apply(amount, RateQuote::unconverted())
            }
        }
    }

    /// Converts preferring a valid pinned rate, then a fresh cached rate for
    /// `date`, then the provider chain.
    pub async fn convert_with_pin(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        date: NaiveDate,
        pinned: Option<&PinnedRates>,
    ) -> Conversion {
        let pair = CurrencyPair::new(from, to);
        let quote = self.rate_with_pin(&pair, date, pinned).await;
        Conversion::apply(amount, quote)
    }

    /// The rate `convert_with_pin` would apply to `pair`.
    pub async fn rate_with_pin(
        &self,
        pair: &CurrencyPair,
        date: NaiveDate,
        pinned: Option<&PinnedRates>,
    ) -> RateQuote {
        if pair.is_identity() {
            return RateQuote::identity();
        }
        if let Some(rate) = pinned.and_then(|pins| pins.get(pair)) {
            debug!(%pair, rate, "Using pinned rate");
            return RateQuote {
                rate,
                origin: RateOrigin::Pinned,
            };
        }
        if let Some(rate) = self.cache().get(pair, date) {
            return RateQuote {
                rate,
                origin: RateOrigin::Cached,
            };
        }
        self.chain.fetch_rate(pair, date).await
    }

    /// Resolves the rate for a pair on a date, as `convert` would use it.
    pub async fn rate(&self, pair: &CurrencyPair, date: NaiveDate) -> RateQuote {
        self.chain.fetch_rate(pair, date).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::chain::tests::{MockRateProvider, fixed_clock, today};
    use crate::core::clock::{Clock, ManualClock};
    use chrono::{TimeDelta, TimeZone, Utc};

    pub(crate) fn converter_with(
        primary: &Arc<MockRateProvider>,
        secondary: &Arc<MockRateProvider>,
        clock: Arc<dyn Clock>,
    ) -> Converter {
        let cache = Arc::new(RateCache::new(clock.clone()));
        Converter::new(RateSourceChain::new(
            primary.clone(),
            secondary.clone(),
            cache,
            clock,
        ))
    }

    fn providers(rate: f64) -> (Arc<MockRateProvider>, Arc<MockRateProvider>) {
        (
            Arc::new(MockRateProvider::returning("primary", rate)),
            Arc::new(MockRateProvider::failing("secondary")),
        )
    }

    #[tokio::test]
    async fn test_identity_conversion_makes_no_calls() {
        let (primary, secondary) = providers(0.9);
        let converter = converter_with(&primary, &secondary, fixed_clock());

        for amount in [0.0, -42.5, 1234.56, f64::MAX] {
            assert_eq!(converter.convert(amount, "EUR", "EUR", None).await.value, amount);
            assert_eq!(converter.convert_sync(amount, "EUR", "eur").value, amount);
            let pinned = converter
                .convert_with_pin(amount, "EUR", "EUR", today(), None)
                .await;
            assert_eq!(pinned.value, amount);
            assert_eq!(pinned.origin, RateOrigin::Identity);
        }
        assert_eq!(primary.calls() + secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_multiplies_fetched_rate() {
        let (primary, secondary) = providers(0.9);
        let converter = converter_with(&primary, &secondary, fixed_clock());

        let result = converter.convert(200.0, "USD", "EUR", Some(today())).await;
        assert_eq!(result.value, 180.0);
        assert_eq!(result.origin, RateOrigin::Fetched("primary".to_string()));
    }

    #[tokio::test]
    async fn test_all_providers_down_resolves_to_amount() {
        let primary = Arc::new(MockRateProvider::failing("primary"));
        let secondary = Arc::new(MockRateProvider::failing("secondary"));
        let converter = converter_with(&primary, &secondary, fixed_clock());

        let result = converter.convert(100.0, "USD", "EUR", Some(today())).await;
        assert_eq!(result.value, 100.0);
        assert!(result.is_unconverted());
    }

    #[tokio::test]
    async fn test_pinned_rate_takes_precedence() {
        let (primary, secondary) = providers(0.5);
        let converter = converter_with(&primary, &secondary, fixed_clock());
        converter
            .cache()
            .put(CurrencyPair::new("USD", "EUR"), today(), 0.7);

        let pins: PinnedRates = [(CurrencyPair::new("USD", "EUR"), 0.90)].into_iter().collect();
        let result = converter
            .convert_with_pin(100.0, "USD", "EUR", today(), Some(&pins))
            .await;
        assert_eq!(result.value, 90.0);
        assert_eq!(result.origin, RateOrigin::Pinned);
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_pin_falls_through() {
        let (primary, secondary) = providers(0.5);
        let converter = converter_with(&primary, &secondary, fixed_clock());

        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            converter.cache().clear();
            let pins: PinnedRates = [(CurrencyPair::new("USD", "EUR"), bad)].into_iter().collect();
            let result = converter
                .convert_with_pin(100.0, "USD", "EUR", today(), Some(&pins))
                .await;
            assert_eq!(result.value, 50.0);
            assert_eq!(result.origin, RateOrigin::Fetched("primary".to_string()));
        }
        assert_eq!(primary.calls(), 4);
    }

    #[tokio::test]
    async fn test_pin_lookup_uses_cache_before_network() {
        let (primary, secondary) = providers(0.5);
        let converter = converter_with(&primary, &secondary, fixed_clock());
        converter
            .cache()
            .put(CurrencyPair::new("USD", "EUR"), today(), 0.7);

        let result = converter
            .convert_with_pin(100.0, "USD", "EUR", today(), None)
            .await;
        assert_eq!(result.value, 70.0);
        assert_eq!(result.origin, RateOrigin::Cached);
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_refetch() {
        let (primary, secondary) = providers(0.5);
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        ));
        let converter = converter_with(&primary, &secondary, clock.clone());

        converter.convert_with_pin(1.0, "USD", "EUR", today(), None).await;
        assert_eq!(primary.calls(), 1);

        clock.advance(TimeDelta::minutes(4) + TimeDelta::seconds(59));
        let reused = converter.convert_with_pin(1.0, "USD", "EUR", today(), None).await;
        assert_eq!(reused.origin, RateOrigin::Cached);
        assert_eq!(primary.calls(), 1);

        clock.advance(TimeDelta::seconds(2));
        let refetched = converter.convert_with_pin(1.0, "USD", "EUR", today(), None).await;
        assert_eq!(refetched.origin, RateOrigin::Fetched("primary".to_string()));
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn test_convert_sync_is_cache_only() {
        let (primary, secondary) = providers(0.5);
        let converter = converter_with(&primary, &secondary, fixed_clock());

        let miss = converter.convert_sync(100.0, "USD", "EUR");
        assert_eq!(miss.value, 100.0);
        assert!(miss.is_unconverted());

        converter.convert(1.0, "USD", "EUR", None).await;
        let hit = converter.convert_sync(100.0, "USD", "EUR");
        assert_eq!(hit.value, 50.0);
        assert_eq!(hit.origin, RateOrigin::Cached);
        assert_eq!(primary.calls(), 1);
    }
}
