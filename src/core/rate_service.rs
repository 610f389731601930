use crate::core::cache::RatesCache;
use crate::core::conversion;
use crate::core::normalizer::normalize;
use crate::core::reconciler::{reconcile_latest, reconcile_timeline};
use crate::core::{RateRecord, RateSource, Storage};
use crate::domain::catalog::{CurrencyCode, SeriesCatalog, SeriesEntry};
use crate::domain::date::{parse_iso_date, to_upstream, today_in_istanbul, DateRange};
use crate::domain::model::{Conversion, ConversionSide, CurrencyInfo, KeyCheckReport};
use crate::utils::error::{RatesError, Result};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// 取最新匯率時往回查的天數 (週末、假日沒有資料)
    pub lookback_days: i64,
    /// Currencies fetched at the same time; 1 means one after another.
    pub concurrent_requests: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            concurrent_requests: 1,
        }
    }
}

/// Entry point for every rate lookup: catalog resolution, upstream fetch,
/// normalization and reconciliation.
pub struct RateService {
    source: Arc<dyn RateSource>,
    catalog: SeriesCatalog,
    settings: BatchSettings,
}

impl RateService {
    pub fn new(source: Arc<dyn RateSource>, catalog: SeriesCatalog, settings: BatchSettings) -> Self {
        Self {
            source,
            catalog,
            settings,
        }
    }

    pub fn catalog(&self) -> &SeriesCatalog {
        &self.catalog
    }

    pub fn list_currencies(&self) -> Vec<CurrencyInfo> {
        self.catalog.currencies()
    }

    /// Latest buy/sell pair per requested currency. Unknown codes and
    /// currencies whose lookup fails are left out; the batch itself never fails.
    pub async fn get_current_rates(&self, codes: &[String]) -> Vec<RateRecord> {
        self.get_current_rates_on(codes, today_in_istanbul()).await
    }

    pub async fn get_current_rates_on(&self, codes: &[String], today: NaiveDate) -> Vec<RateRecord> {
        let entries: Vec<&SeriesEntry> = codes
            .iter()
            .filter_map(|code| {
                let entry = self.catalog.resolve(code);
                if entry.is_none() {
                    tracing::debug!("Skipping unsupported currency '{}'", code);
                }
                entry
            })
            .collect();

        let range = DateRange::last_days(today, self.settings.lookback_days);
        let fallback_date = to_upstream(today);
        let width = self.settings.concurrent_requests.max(1);

        tracing::info!(
            "📡 Fetching current rates for {} currencies ({} -> {}, width {})",
            entries.len(),
            range.start_param(),
            range.end_param(),
            width
        );

        // buffered 保留請求順序
        let lookups: Vec<_> = entries
            .into_iter()
            .map(|entry| self.lookup_latest(entry, &range, &fallback_date))
            .collect();
        let rates: Vec<RateRecord> = stream::iter(lookups)
            .buffered(width)
            .filter_map(futures::future::ready)
            .collect()
            .await;

        tracing::info!("✅ Resolved current rates for {} currencies", rates.len());
        rates
    }

    /// Failures are logged and turned into `None` so the batch carries on.
    async fn lookup_latest(
        &self,
        entry: &SeriesEntry,
        range: &DateRange,
        fallback_date: &str,
    ) -> Option<RateRecord> {
        match self.fetch_latest(entry, range, fallback_date).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(currency = %entry.code, error = %e, "❌ Error fetching rates");
                None
            }
        }
    }

    /// 買入、賣出依序查詢
    async fn fetch_latest(
        &self,
        entry: &SeriesEntry,
        range: &DateRange,
        fallback_date: &str,
    ) -> Result<Option<RateRecord>> {
        let buy = normalize(&self.source.fetch_series(&entry.buy, range).await?);
        let sell = normalize(&self.source.fetch_series(&entry.sell, range).await?);

        Ok(reconcile_latest(entry, &buy, &sell, fallback_date))
    }

    /// Same-day cache first; only currencies missing from it go upstream.
    pub async fn get_current_rates_cached<S: Storage>(
        &self,
        cache: &RatesCache<S>,
        codes: &[String],
    ) -> Vec<RateRecord> {
        let today = today_in_istanbul();

        if let Some(rates) = cache.cached_rates(codes, today).await {
            tracing::info!("📦 Serving {} rates from cache", rates.len());
            return rates;
        }

        let missing = cache.missing_currencies(codes, today).await;
        tracing::debug!("Cache missing currencies: {:?}", missing);

        let fresh = self.get_current_rates_on(&missing, today).await;
        if !fresh.is_empty() {
            cache.merge(&fresh, today).await;
        }

        let mut by_currency: HashMap<CurrencyCode, RateRecord> = cache
            .snapshot(today)
            .await
            .into_iter()
            .map(|record| (record.currency, record))
            .collect();
        for record in fresh {
            by_currency.insert(record.currency, record);
        }

        codes
            .iter()
            .filter_map(|code| code.parse::<CurrencyCode>().ok())
            .filter_map(|code| by_currency.get(&code).cloned())
            .collect()
    }

    /// Full aligned timeline for one currency, newest first. Any fetch failure propagates.
    pub async fn get_historical_rates(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<RateRecord>> {
        let entry = self
            .catalog
            .resolve(code)
            .ok_or_else(|| RatesError::UnsupportedCurrency {
                code: code.to_string(),
            })?;

        let range = DateRange::new(
            parse_iso_date("startDate", start_date)?,
            parse_iso_date("endDate", end_date)?,
        );

        tracing::info!(
            "📡 Fetching historical {} rates {} -> {}",
            entry.code,
            range.start_param(),
            range.end_param()
        );

        let buy = normalize(&self.source.fetch_series(&entry.buy, &range).await?);
        let sell = normalize(&self.source.fetch_series(&entry.sell, &range).await?);

        let rates = reconcile_timeline(entry, &buy, &sell);
        tracing::info!("✅ {} historical records for {}", rates.len(), entry.code);
        Ok(rates)
    }

    pub async fn check_key(&self) -> Result<KeyCheckReport> {
        self.source.check_key().await
    }

    /// 以當前賣出匯率換算
    pub async fn convert(
        &self,
        amount: f64,
        from: ConversionSide,
        to: ConversionSide,
    ) -> Result<Conversion> {
        let codes: Vec<String> = [from, to]
            .iter()
            .filter_map(|side| match side {
                ConversionSide::Foreign(code) => Some(code.to_string()),
                ConversionSide::Try => None,
            })
            .collect();

        let rates = if codes.is_empty() {
            Vec::new()
        } else {
            self.get_current_rates(&codes).await
        };

        conversion::convert(amount, from, to, &rates)
    }
}
