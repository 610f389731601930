use crate::domain::catalog::SeriesId;
use crate::domain::date::DateRange;
use crate::domain::model::KeyCheckReport;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn key_check_timeout(&self) -> Duration;
}

/// 上游匯率來源
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Raw, shape-unknown payload for one series over `range`.
    async fn fetch_series(&self, series: &SeriesId, range: &DateRange) -> Result<serde_json::Value>;

    async fn check_key(&self) -> Result<KeyCheckReport>;
}
