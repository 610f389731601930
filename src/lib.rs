pub mod adapters;
#[cfg(feature = "server")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

use std::sync::Arc;

pub use adapters::{storage::LocalStorage, tcmb_client::TcmbClient};
#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::RatesConfig;
pub use crate::core::cache::RatesCache;
pub use crate::core::rate_service::{BatchSettings, RateService};
pub use domain::catalog::{CurrencyCode, SeriesCatalog};
pub use domain::model::{ConversionSide, RateRecord};
pub use utils::error::{RatesError, Result};

/// 以配置組出完整的服務：EVDS client + 固定的序列目錄
pub fn rate_service(config: &RatesConfig) -> RateService {
    let source = TcmbClient::new(config.clone());
    RateService::new(Arc::new(source), SeriesCatalog::tcmb(), config.batch_settings())
}

/// 快取關閉時回傳 None
pub fn rates_cache(config: &RatesConfig) -> Option<RatesCache<LocalStorage>> {
    config
        .cache_enabled()
        .then(|| RatesCache::new(LocalStorage::new(config.cache_path())))
}
