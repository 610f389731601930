use crate::core::{ConfigProvider, RateSource};
use crate::domain::catalog::SeriesId;
use crate::domain::date::{today_in_istanbul, DateRange};
use crate::domain::model::KeyCheckReport;
use crate::utils::error::{RatesError, Result};
use crate::utils::logger::mask_secret;
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// 上游會擋掉沒有瀏覽器 User-Agent 的請求
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// API key 檢查時查詢的序列 (USD 賣出)
pub const KEY_CHECK_SERIES: &str = "TP.DK.USD.S";

const KEY_CHECK_PREVIEW_CHARS: usize = 500;

/// EVDS HTTP client. The key travels in the `key` header, never in the URL.
pub struct TcmbClient<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> TcmbClient<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// `{base}/series=...&startDate=DD-MM-YYYY&endDate=DD-MM-YYYY&type=json`
    pub fn series_url(&self, series: &SeriesId, range: &DateRange) -> String {
        let base_url = self.config.base_url();
        let base_url = base_url.strip_suffix('/').unwrap_or(base_url);
        let series: String = url::form_urlencoded::byte_serialize(series.as_str().as_bytes()).collect();

        format!(
            "{}/series={}&startDate={}&endDate={}&type=json",
            base_url,
            series,
            range.start_param(),
            range.end_param()
        )
    }

    fn api_key(&self) -> Result<&str> {
        let key = self.config.api_key().filter(|key| !key.trim().is_empty());
        validate_required_field("upstream.api_key", &key).map(|key| *key)
    }
}

#[async_trait]
impl<C: ConfigProvider> RateSource for TcmbClient<C> {
    async fn fetch_series(&self, series: &SeriesId, range: &DateRange) -> Result<Value> {
        let key = self.api_key()?;
        let url = self.series_url(series, range);

        tracing::debug!("📡 Making API request to: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header("key", key)
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(connectivity_error)?;

        let status = response.status();
        tracing::debug!("📡 {}: API response status: {}", series, status);

        let body = response.text().await.map_err(connectivity_error)?;

        if status == StatusCode::FORBIDDEN {
            tracing::error!("❌ {}: upstream rejected the API key", series);
            return Err(RatesError::AuthError);
        }

        if status != StatusCode::OK {
            let body = if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            };
            return Err(RatesError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Err(RatesError::EmptyResponse);
        }

        // 非 JSON 回應交給 normalizer 當成空序列處理
        match serde_json::from_str::<Value>(&body) {
            Ok(payload) => Ok(payload),
            Err(e) => {
                tracing::warn!("⚠️ {}: response is not JSON ({}), passing through as text", series, e);
                Ok(Value::String(body))
            }
        }
    }

    /// Every status is reported, not raised; only a missing response is an error.
    async fn check_key(&self) -> Result<KeyCheckReport> {
        let key = self.api_key()?;
        let range = DateRange::last_days(today_in_istanbul(), 1);
        let url = self.series_url(&SeriesId::new(KEY_CHECK_SERIES), &range);

        tracing::info!("🔑 Testing API key {} with URL: {}", mask_secret(key), url);

        let response = self
            .client
            .get(&url)
            .header("key", key)
            .timeout(self.config.key_check_timeout())
            .send()
            .await
            .map_err(connectivity_error)?;

        let status = response.status();
        let body = response.text().await.map_err(connectivity_error)?;

        let message = match status {
            StatusCode::OK => "API key looks valid".to_string(),
            StatusCode::FORBIDDEN => {
                "API key is invalid or access was denied. Request a new key at https://evds2.tcmb.gov.tr/"
                    .to_string()
            }
            other => format!("Unexpected status: {}", other.as_u16()),
        };

        Ok(KeyCheckReport {
            success: status == StatusCode::OK,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            message,
            data: (!body.is_empty()).then(|| body.chars().take(KEY_CHECK_PREVIEW_CHARS).collect()),
        })
    }
}

fn connectivity_error(e: reqwest::Error) -> RatesError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    RatesError::ConnectivityError { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct MockConfig {
        base_url: String,
        api_key: Option<String>,
    }

    impl ConfigProvider for MockConfig {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(15)
        }

        fn key_check_timeout(&self) -> Duration {
            Duration::from_secs(10)
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_series_url_strips_trailing_slash() {
        let client = TcmbClient::new(MockConfig {
            base_url: "https://evds2.tcmb.gov.tr/service/evds/".to_string(),
            api_key: Some("key".to_string()),
        });

        assert_eq!(
            client.series_url(&SeriesId::new("TP.DK.USD.A"), &range()),
            "https://evds2.tcmb.gov.tr/service/evds/series=TP.DK.USD.A&startDate=01-01-2024&endDate=31-01-2024&type=json"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let client = TcmbClient::new(MockConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: Some("   ".to_string()),
        });

        let err = client
            .fetch_series(&SeriesId::new("TP.DK.USD.A"), &range())
            .await
            .unwrap_err();
        assert!(matches!(err, RatesError::MissingConfigError { .. }));
    }

    #[tokio::test]
    async fn test_absent_key_names_the_config_field() {
        let client = TcmbClient::new(MockConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
        });

        match client.check_key().await.unwrap_err() {
            RatesError::MissingConfigError { field } => assert_eq!(field, "upstream.api_key"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
