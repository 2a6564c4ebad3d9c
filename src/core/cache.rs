use crate::core::clock::Clock;
use crate::core::currency::CurrencyPair;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedRate {
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

type CacheKey = (CurrencyPair, NaiveDate);

/// In-memory exchange rate cache keyed by pair and date.
///
/// Entries are reused while younger than the ttl; staleness is checked on
/// read. Once `capacity` keys are held, inserting a new key first drops expired
/// entries and then, if needed, the oldest fetch.
pub struct RateCache {
    inner: Mutex<HashMap<CacheKey, CachedRate>>,
    ttl: TimeDelta,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(clock, DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    pub fn with_limits(clock: Arc<dyn Clock>, ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            capacity: capacity.max(1),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedRate>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CachedRate, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.ttl
    }

    /// Returns the cached rate if it is still within the freshness window.
    pub fn get(&self, pair: &CurrencyPair, date: NaiveDate) -> Option<f64> {
        let now = self.clock.now();
        let cache = self.lock();
        match cache.get(&(pair.clone(), date)) {
            Some(entry) if self.is_fresh(entry, now) => {
                debug!(%pair, %date, "Cache HIT");
                Some(entry.rate)
            }
            Some(_) => {
                debug!(%pair, %date, "Cache entry expired");
                None
            }
            None => {
                debug!(%pair, %date, "Cache MISS");
                None
            }
        }
    }

    /// Returns any cached rate regardless of age.
    pub fn peek(&self, pair: &CurrencyPair, date: NaiveDate) -> Option<f64> {
        self.lock().get(&(pair.clone(), date)).map(|entry| entry.rate)
    }

    pub fn put(&self, pair: CurrencyPair, date: NaiveDate, rate: f64) {
        if pair.is_identity() {
            return;
        }
        let now = self.clock.now();
        let mut cache = self.lock();
        let key = (pair, date);
        if !cache.contains_key(&key) && cache.len() >= self.capacity {
            cache.retain(|_, entry| now - entry.fetched_at < self.ttl);
            if cache.len() >= self.capacity {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, entry)| entry.fetched_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    debug!(pair = %oldest.0, date = %oldest.1, "Cache EVICT");
                    cache.remove(&oldest);
                }
            }
        }
        debug!(pair = %key.0, date = %key.1, rate, "Cache PUT");
        cache.insert(
            key,
            CachedRate {
                rate,
                fetched_at: now,
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
        debug!("Cache CLEAR");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
