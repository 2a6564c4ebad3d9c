//! Ordered fallback over the remote rate providers.

use crate::core::cache::RateCache;
use crate::core::clock::Clock;
use crate::core::currency::{
    CurrencyPair, CurrencyRateProvider, RateDate, RateOrigin, RateQuote, is_usable_rate,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves a rate for a pair and date from the primary provider, falling back
/// to the secondary, and finally to an `Unconverted` 1:1 quote.
///
/// Successful fetches are written to the shared cache under the requested date.
pub struct RateSourceChain {
    primary: Arc<dyn CurrencyRateProvider>,
    secondary: Arc<dyn CurrencyRateProvider>,
    cache: Arc<RateCache>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl RateSourceChain {
    pub fn new(
        primary: Arc<dyn CurrencyRateProvider>,
        secondary: Arc<dyn CurrencyRateProvider>,
        cache: Arc<RateCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
            clock,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub async fn fetch_rate(&self, pair: &CurrencyPair, date: NaiveDate) -> RateQuote {
        if pair.is_identity() {
            return RateQuote::identity();
        }

        let today = self.clock.today();
        let rate_date = if date >= today {
            RateDate::Latest
        } else {
            RateDate::On(date)
        };

        if self.primary.supports(pair) {
            match self.try_provider(self.primary.as_ref(), pair, rate_date).await {
                Ok(rate) => return self.accept(pair, date, rate, self.primary.name()),
                Err(e) => debug!(
                    provider = self.primary.name(),
                    "Primary rate lookup failed for {}: {}", pair, e
                ),
            }
        } else {
            debug!(
                provider = self.primary.name(),
                "Pair {} not covered by primary provider, skipping", pair
            );
        }

        match self
            .try_provider(self.secondary.as_ref(), pair, RateDate::Latest)
            .await
        {
            Ok(rate) => self.accept(pair, date, rate, self.secondary.name()),
            Err(e) => {
                warn!(
                    "All rate providers failed for {} on {}; using 1:1 ({})",
                    pair, date, e
                );
                RateQuote::unconverted()
            }
        }
    }

    async fn try_provider(
        &self,
        provider: &dyn CurrencyRateProvider,
        pair: &CurrencyPair,
        date: RateDate,
    ) -> Result<f64> {
        let rate = tokio::time::timeout(self.timeout, provider.get_rate(pair, date))
            .await
            .map_err(|_| anyhow!("Timed out after {:?}", self.timeout))??;
        if !is_usable_rate(rate) {
            return Err(anyhow!("Unusable rate {} for currency pair: {}", rate, pair));
        }
        Ok(rate)
    }

    fn accept(&self, pair: &CurrencyPair, date: NaiveDate, rate: f64, source: &str) -> RateQuote {
        self.cache.put(pair.clone(), date, rate);
        RateQuote {
            rate,
            origin: RateOrigin::Fetched(source.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider that records every request it receives.
    pub(crate) struct MockRateProvider {
        name: &'static str,
        rate: Option<f64>,
        allow_list: Option<Vec<&'static str>>,
        delay: Option<Duration>,
        /// Added to the rate once per earlier call.
        drift: f64,
        pub(crate) call_count: AtomicUsize,
        pub(crate) requests: Mutex<Vec<(CurrencyPair, RateDate)>>,
    }

    impl MockRateProvider {
        pub(crate) fn returning(name: &'static str, rate: f64) -> Self {
            Self {
                name,
                rate: Some(rate),
                allow_list: None,
                delay: None,
                drift: 0.0,
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(name: &'static str) -> Self {
            Self {
                rate: None,
                ..Self::returning(name, 0.0)
            }
        }

        pub(crate) fn with_allow_list(mut self, codes: Vec<&'static str>) -> Self {
            self.allow_list = Some(codes);
            self
        }

        /// Each call answers `step` higher than the previous one.
        pub(crate) fn with_drift(mut self, step: f64) -> Self {
            self.drift = step;
            self
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub(crate) fn last_request(&self) -> Option<(CurrencyPair, RateDate)> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CurrencyRateProvider for MockRateProvider {
        async fn get_rate(&self, pair: &CurrencyPair, date: RateDate) -> Result<f64> {
            let previous_calls = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push((pair.clone(), date));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.rate
                .map(|rate| rate + self.drift * previous_calls as f64)
                .ok_or_else(|| anyhow!("{} unavailable", self.name))
        }

        fn name(&self) -> &str {
            self.name
        }

        fn supports(&self, pair: &CurrencyPair) -> bool {
            match &self.allow_list {
                Some(codes) => codes.contains(&pair.base()) && codes.contains(&pair.quote()),
                None => true,
            }
        }
    }

    pub(crate) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    pub(crate) fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        ))
    }

    fn chain(
        primary: &Arc<MockRateProvider>,
        secondary: &Arc<MockRateProvider>,
    ) -> RateSourceChain {
        let clock = fixed_clock();
        let cache = Arc::new(RateCache::new(clock.clone()));
        RateSourceChain::new(primary.clone(), secondary.clone(), cache, clock)
    }

    #[tokio::test]
    async fn test_identity_skips_providers() {
        let primary = Arc::new(MockRateProvider::returning("primary", 0.9));
        let secondary = Arc::new(MockRateProvider::returning("secondary", 0.8));
        let chain = chain(&primary, &secondary);

        let quote = chain.fetch_rate(&CurrencyPair::new("USD", "usd"), today()).await;
        assert_eq!(quote, RateQuote::identity());
        assert_eq!(primary.calls() + secondary.calls(), 0);
        assert!(chain.cache().is_empty());
    }

    #[tokio::test]
    async fn test_primary_success_is_cached() {
        let primary = Arc::new(MockRateProvider::returning("primary", 0.9));
        let secondary = Arc::new(MockRateProvider::returning("secondary", 0.8));
        let chain = chain(&primary, &secondary);
        let pair = CurrencyPair::new("USD", "EUR");

        let quote = chain.fetch_rate(&pair, today()).await;
        assert_eq!(quote.rate, 0.9);
        assert_eq!(quote.origin, RateOrigin::Fetched("primary".to_string()));
        assert_eq!(primary.last_request(), Some((pair.clone(), RateDate::Latest)));
        assert_eq!(secondary.calls(), 0);
        assert_eq!(chain.cache().get(&pair, today()), Some(0.9));
    }

    #[tokio::test]
    async fn test_past_date_uses_historical_endpoint() {
        let primary = Arc::new(MockRateProvider::returning("primary", 0.88));
        let secondary = Arc::new(MockRateProvider::returning("secondary", 0.8));
        let chain = chain(&primary, &secondary);
        let pair = CurrencyPair::new("USD", "EUR");
        let past = NaiveDate::from_ymd_opt(2023, 12, 29).unwrap();

        chain.fetch_rate(&pair, past).await;
        assert_eq!(primary.last_request(), Some((pair.clone(), RateDate::On(past))));
        assert_eq!(chain.cache().get(&pair, past), Some(0.88));
    }

    #[tokio::test]
    async fn test_future_date_is_clamped_to_today() {
        let primary = Arc::new(MockRateProvider::returning("primary", 0.9));
        let secondary = Arc::new(MockRateProvider::returning("secondary", 0.8));
        let chain = chain(&primary, &secondary);
        let pair = CurrencyPair::new("USD", "EUR");
        let future = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        chain.fetch_rate(&pair, future).await;
        assert_eq!(primary.last_request(), Some((pair.clone(), RateDate::Latest)));
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let primary = Arc::new(MockRateProvider::failing("primary"));
        let secondary = Arc::new(MockRateProvider::returning("secondary", 0.8));
        let chain = chain(&primary, &secondary);
        let pair = CurrencyPair::new("USD", "EUR");
        let past = NaiveDate::from_ymd_opt(2023, 12, 29).unwrap();

        let quote = chain.fetch_rate(&pair, past).await;
        assert_eq!(quote.rate, 0.8);
        assert_eq!(quote.origin, RateOrigin::Fetched("secondary".to_string()));
        assert_eq!(primary.calls(), 1);
        // Secondary only serves latest rates
        assert_eq!(secondary.last_request(), Some((pair.clone(), RateDate::Latest)));
        assert_eq!(chain.cache().get(&pair, past), Some(0.8));
    }

    #[tokio::test]
    async fn test_pair_outside_allow_list_routes_to_secondary() {
        let primary = Arc::new(
            MockRateProvider::returning("primary", 0.9).with_allow_list(vec!["USD", "EUR"]),
        );
        let secondary = Arc::new(MockRateProvider::returning("secondary", 1550.0));
        let chain = chain(&primary, &secondary);

        let quote = chain.fetch_rate(&CurrencyPair::new("USD", "NGN"), today()).await;
        assert_eq!(quote.rate, 1550.0);
        assert_eq!(primary.calls(), 0);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_providers_down_is_unconverted() {
        let primary = Arc::new(MockRateProvider::failing("primary"));
        let secondary = Arc::new(MockRateProvider::failing("secondary"));
        let chain = chain(&primary, &secondary);
        let pair = CurrencyPair::new("USD", "EUR");

        let quote = chain.fetch_rate(&pair, today()).await;
        assert_eq!(quote, RateQuote::unconverted());
        assert!(chain.cache().get(&pair, today()).is_none());
    }

    #[tokio::test]
    async fn test_unusable_provider_rate_is_a_failure() {
        let primary = Arc::new(MockRateProvider::returning("primary", 0.0));
        let secondary = Arc::new(MockRateProvider::returning("secondary", f64::NAN));
        let chain = chain(&primary, &secondary);

        let quote = chain.fetch_rate(&CurrencyPair::new("USD", "EUR"), today()).await;
        assert_eq!(quote, RateQuote::unconverted());
        assert!(chain.cache().is_empty());
    }

    #[tokio::test]
    async fn test_slow_primary_times_out() {
        let primary = Arc::new(
            MockRateProvider::returning("primary", 0.9).with_delay(Duration::from_millis(500)),
        );
        let secondary = Arc::new(MockRateProvider::returning("secondary", 0.8));
        let chain = chain(&primary, &secondary).with_timeout(Duration::from_millis(20));

        let quote = chain.fetch_rate(&CurrencyPair::new("USD", "EUR"), today()).await;
        assert_eq!(quote.origin, RateOrigin::Fetched("secondary".to_string()));
    }
}
