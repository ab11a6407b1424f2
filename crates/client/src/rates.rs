//! Exchange-rate fetching and caching.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use reqwest::Url;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use engine::{Currency, RateTable};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

pub trait RateSource {
    /// Fetches a fresh USD-based snapshot.
    fn latest(&self) -> impl Future<Output = Result<RateTable>> + Send;
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: BTreeMap<String, f64>,
}

/// Rate source backed by a JSON endpoint returning `{ "rates": { ... } }`.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    url: Url,
    http: reqwest::Client,
}

impl HttpRateSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let url = Url::parse(&config.rates_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", config.rates_url)))?;
        Ok(Self {
            url,
            http: reqwest::Client::new(),
        })
    }
}

impl RateSource for HttpRateSource {
    async fn latest(&self) -> Result<RateTable> {
        let payload: RatesPayload = self
            .http
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut table = RateTable::new();
        for (code, rate) in payload.rates {
            match Currency::try_from(code.as_str()) {
                Ok(currency) => table.insert(currency, rate),
                Err(_) => debug!(code = %code, "skipping non-currency rate entry"),
            }
        }
        Ok(table)
    }
}

/// Holds the current snapshot and refreshes it through a [`RateSource`]
/// once it is older than the configured window.
///
/// A failed refresh keeps serving the stale snapshot with a warning; rates
/// a day old beat no rates at all. Only a cache that never fetched
/// anything propagates the fetch error.
pub struct RateCache {
    refresh_after: Duration,
    current: RwLock<Option<RateTable>>,
}

impl RateCache {
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            refresh_after: Duration::hours(config.rate_refresh_hours as i64),
            current: RwLock::new(None),
        }
    }

    /// Seeds the cache with an existing snapshot.
    #[must_use]
    pub fn with_table(self, table: RateTable) -> Self {
        Self {
            refresh_after: self.refresh_after,
            current: RwLock::new(Some(table)),
        }
    }

    pub async fn table<S: RateSource>(&self, source: &S) -> Result<RateTable> {
        {
            let guard = self.current.read().await;
            if let Some(table) = guard.as_ref() {
                if Utc::now() - table.fetched_at() < self.refresh_after {
                    return Ok(table.clone());
                }
            }
        }

        match source.latest().await {
            Ok(fresh) => {
                debug!("refreshed rate snapshot");
                let mut guard = self.current.write().await;
                *guard = Some(fresh.clone());
                Ok(fresh)
            }
            Err(err) => {
                let guard = self.current.read().await;
                match guard.as_ref() {
                    Some(stale) => {
                        warn!(error = %err, "rate refresh failed, serving stale snapshot");
                        Ok(stale.clone())
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Drops the cached snapshot so the next call must fetch.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl RateSource for CountingSource {
        async fn latest(&self) -> Result<RateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::Provider {
                    status: 503,
                    message: "down".to_string(),
                });
            }
            Ok(RateTable::from_iter([(Currency::usd(), 1.0)]))
        }
    }

    fn config(hours: u64) -> ClientConfig {
        ClientConfig {
            rate_refresh_hours: hours,
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn fresh_snapshots_are_served_without_fetching() {
        let source = CountingSource::new(false);
        let cache = RateCache::new(&config(24));

        cache.table(&source).await.unwrap();
        cache.table(&source).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_snapshot_survives_a_failed_refresh() {
        let failing = CountingSource::new(true);
        let eur = Currency::try_from("EUR").unwrap();
        let old = RateTable::from_iter([(eur.clone(), 0.93)])
            .with_fetched_at(Utc::now() - Duration::hours(48));
        let cache = RateCache::new(&config(24)).with_table(old);

        let table = cache.table(&failing).await.unwrap();
        assert_eq!(table.rate(&eur), Some(0.93));
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_cache_propagates_fetch_errors() {
        let failing = CountingSource::new(true);
        let cache = RateCache::new(&config(24));
        assert!(cache.table(&failing).await.is_err());
    }

    #[tokio::test]
    async fn invalidate_forces_a_fetch() {
        let source = CountingSource::new(false);
        let cache = RateCache::new(&config(24));

        cache.table(&source).await.unwrap();
        cache.invalidate().await;
        cache.table(&source).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
