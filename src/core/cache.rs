use crate::core::{RateRecord, Storage};
use crate::domain::date::to_upstream;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const CACHE_FILE: &str = "rates_cache.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub rates: Vec<RateRecord>,
    /// 寫入快取的日期 (DD-MM-YYYY，伊斯坦堡時間)
    pub date: String,
}

/// Same-day cache of current rates. Best effort: every failure is a miss.
pub struct RatesCache<S: Storage> {
    storage: S,
}

impl<S: Storage> RatesCache<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// 只有當天且非空的快取才算有效
    async fn load(&self, today: NaiveDate) -> Option<CacheSnapshot> {
        let bytes = match self.storage.read_file(CACHE_FILE).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Rates cache not readable: {}", e);
                return None;
            }
        };

        let snapshot: CacheSnapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("⚠️ Ignoring corrupt rates cache: {}", e);
                return None;
            }
        };

        if snapshot.date == to_upstream(today) && !snapshot.rates.is_empty() {
            Some(snapshot)
        } else {
            tracing::debug!("Rates cache from {} is stale", snapshot.date);
            None
        }
    }

    pub async fn snapshot(&self, today: NaiveDate) -> Vec<RateRecord> {
        self.load(today)
            .await
            .map(|snapshot| snapshot.rates)
            .unwrap_or_default()
    }

    /// All requested currencies in request order, or `None` if any is missing.
    pub async fn cached_rates(&self, codes: &[String], today: NaiveDate) -> Option<Vec<RateRecord>> {
        if codes.is_empty() {
            return None;
        }
        let snapshot = self.load(today).await?;

        codes
            .iter()
            .map(|code| {
                snapshot
                    .rates
                    .iter()
                    .find(|record| record.currency.as_str() == code)
                    .cloned()
            })
            .collect()
    }

    pub async fn missing_currencies(&self, codes: &[String], today: NaiveDate) -> Vec<String> {
        let cached: HashSet<&'static str> = self
            .snapshot(today)
            .await
            .iter()
            .map(|record| record.currency.as_str())
            .collect();

        codes
            .iter()
            .filter(|code| !cached.contains(code.as_str()))
            .cloned()
            .collect()
    }

    /// Replace cached entries by currency and stamp the cache with `today`.
    pub async fn merge(&self, new_rates: &[RateRecord], today: NaiveDate) {
        let mut rates = self.snapshot(today).await;

        for rate in new_rates {
            match rates.iter_mut().find(|record| record.currency == rate.currency) {
                Some(existing) => *existing = rate.clone(),
                None => rates.push(rate.clone()),
            }
        }

        let snapshot = CacheSnapshot {
            rates,
            date: to_upstream(today),
        };

        let bytes = match serde_json::to_vec_pretty(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("⚠️ Failed to serialize rates cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.write_file(CACHE_FILE, &bytes).await {
            tracing::warn!("⚠️ Failed to write rates cache: {}", e);
        } else {
            tracing::debug!("Cached {} rates for {}", snapshot.rates.len(), snapshot.date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CurrencyCode;
    use crate::utils::error::{RatesError, Result};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                RatesError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn record(currency: CurrencyCode, sell: f64) -> RateRecord {
        RateRecord {
            currency,
            buy_rate: Some(sell - 0.1),
            sell_rate: Some(sell),
            date: "05-01-2024".to_string(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_cache_misses_everything() {
        let cache = RatesCache::new(MockStorage::new());

        assert!(cache.cached_rates(&codes(&["USD"]), day(5)).await.is_none());
        assert_eq!(
            cache.missing_currencies(&codes(&["USD", "EUR"]), day(5)).await,
            codes(&["USD", "EUR"])
        );
    }

    #[tokio::test]
    async fn test_merge_then_hit_in_request_order() {
        let cache = RatesCache::new(MockStorage::new());
        cache
            .merge(&[record(CurrencyCode::USD, 30.0), record(CurrencyCode::EUR, 33.0)], day(5))
            .await;

        let hit = cache
            .cached_rates(&codes(&["EUR", "USD"]), day(5))
            .await
            .unwrap();
        assert_eq!(hit[0].currency, CurrencyCode::EUR);
        assert_eq!(hit[1].currency, CurrencyCode::USD);
    }

    #[tokio::test]
    async fn test_partial_cache_is_a_miss_and_reports_missing() {
        let cache = RatesCache::new(MockStorage::new());
        cache.merge(&[record(CurrencyCode::USD, 30.0)], day(5)).await;

        assert!(cache.cached_rates(&codes(&["USD", "CHF"]), day(5)).await.is_none());
        assert_eq!(
            cache.missing_currencies(&codes(&["USD", "CHF"]), day(5)).await,
            codes(&["CHF"])
        );
    }

    #[tokio::test]
    async fn test_merge_replaces_existing_currency() {
        let cache = RatesCache::new(MockStorage::new());
        cache.merge(&[record(CurrencyCode::USD, 30.0)], day(5)).await;
        cache
            .merge(&[record(CurrencyCode::USD, 31.0), record(CurrencyCode::GBP, 40.0)], day(5))
            .await;

        let rates = cache.snapshot(day(5)).await;
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].sell_rate, Some(31.0));
        assert_eq!(rates[1].currency, CurrencyCode::GBP);
    }

    #[tokio::test]
    async fn test_cache_from_yesterday_is_stale() {
        let cache = RatesCache::new(MockStorage::new());
        cache.merge(&[record(CurrencyCode::USD, 30.0)], day(4)).await;

        assert!(cache.cached_rates(&codes(&["USD"]), day(5)).await.is_none());
        assert!(cache.snapshot(day(5)).await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_ignored() {
        let storage = MockStorage::new();
        storage.put(CACHE_FILE, b"{not json").await;
        let cache = RatesCache::new(storage);

        assert!(cache.snapshot(day(5)).await.is_empty());
        cache.merge(&[record(CurrencyCode::USD, 30.0)], day(5)).await;
        assert_eq!(cache.snapshot(day(5)).await.len(), 1);
    }
}
