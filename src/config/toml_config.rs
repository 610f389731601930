use crate::core::rate_service::BatchSettings;
use crate::core::ConfigProvider;
use crate::domain::catalog::CurrencyCode;
use crate::utils::error::{RatesError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "tcmb-rates.toml";
pub const DEFAULT_BASE_URL: &str = "https://evds2.tcmb.gov.tr/service/evds";

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub rates: RatesSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub key_check_timeout_seconds: Option<u64>,
    pub lookback_days: Option<i64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: None,
            key_check_timeout_seconds: None,
            lookback_days: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesSettings {
    pub default_currencies: Option<Vec<String>>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: Option<bool>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: Option<bool>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl RatesConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RatesError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RatesError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 只用預設值與環境變數建立配置
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 指定檔案 > 工作目錄下的預設檔案 > 預設值，最後套用環境變數
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::debug!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${TCMB_API_KEY})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let result = ENV_VAR_PATTERN.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// TCMB_API_URL, TCMB_API_KEY, PORT
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TCMB_API_URL").filter(|v| !v.trim().is_empty()) {
            self.upstream.base_url = url;
        }

        if let Some(key) = lookup("TCMB_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.upstream.api_key = Some(key);
        }

        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            let parsed = port
                .trim()
                .parse::<u16>()
                .map_err(|e| RatesError::InvalidConfigValueError {
                    field: "PORT".to_string(),
                    value: port.clone(),
                    reason: e.to_string(),
                })?;
            self.server.port = Some(parsed);
        }

        Ok(())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("upstream.base_url", &self.upstream.base_url)?;

        if let Some(timeout) = self.upstream.timeout_seconds {
            validate_range("upstream.timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(timeout) = self.upstream.key_check_timeout_seconds {
            validate_range("upstream.key_check_timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(days) = self.upstream.lookback_days {
            validate_range("upstream.lookback_days", days, 1, 365)?;
        }

        if let Some(concurrent) = self.rates.concurrent_requests {
            validate_positive_number("rates.concurrent_requests", concurrent, 1)?;
        }

        for code in self.default_currencies() {
            if code.parse::<CurrencyCode>().is_err() {
                return Err(RatesError::InvalidConfigValueError {
                    field: "rates.default_currencies".to_string(),
                    value: code,
                    reason: "Unsupported currency code".to_string(),
                });
            }
        }

        if let Some(host) = &self.server.host {
            validate_non_empty_string("server.host", host)?;
        }

        if self.cache_enabled() {
            validate_path("cache.path", &self.cache_path())?;
        }

        Ok(())
    }

    pub fn lookback_days(&self) -> i64 {
        self.upstream.lookback_days.unwrap_or(30)
    }

    /// 預設 1，即逐一查詢
    pub fn concurrent_requests(&self) -> usize {
        self.rates.concurrent_requests.unwrap_or(1)
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            lookback_days: self.lookback_days(),
            concurrent_requests: self.concurrent_requests(),
        }
    }

    pub fn default_currencies(&self) -> Vec<String> {
        self.rates.default_currencies.clone().unwrap_or_else(|| {
            ["USD", "EUR", "CHF"].iter().map(|c| c.to_string()).collect()
        })
    }

    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.server.host.as_deref().unwrap_or("0.0.0.0"),
            self.server.port.unwrap_or(3001)
        )
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.enabled.unwrap_or(true)
    }

    pub fn cache_path(&self) -> String {
        self.cache
            .path
            .clone()
            .unwrap_or_else(|| "./.rates-cache".to_string())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl ConfigProvider for RatesConfig {
    fn base_url(&self) -> &str {
        &self.upstream.base_url
    }

    /// 未被替換的 `${VAR}` 視為沒有設定
    fn api_key(&self) -> Option<&str> {
        self.upstream
            .api_key
            .as_deref()
            .filter(|key| !(key.starts_with("${") && key.ends_with('}')))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_seconds.unwrap_or(15))
    }

    fn key_check_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.key_check_timeout_seconds.unwrap_or(10))
    }
}

impl Validate for RatesConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
