use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatesError {
    #[error("TCMB API access denied (403). Check your API key or request a new one at https://evds2.tcmb.gov.tr/")]
    AuthError,

    #[error("TCMB API Error: {status} - {body}")]
    UpstreamError { status: u16, body: String },

    #[error("TCMB API returned an empty response")]
    EmptyResponse,

    #[error("Could not connect to the TCMB API: {message}")]
    ConnectivityError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Unsupported currency: {code}")]
    UnsupportedCurrency { code: String },

    #[error("No rate available for {code}")]
    RateUnavailable { code: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Network,
    Validation,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RatesError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthError | Self::UpstreamError { .. } | Self::EmptyResponse => {
                ErrorCategory::Upstream
            }
            Self::ConnectivityError { .. } => ErrorCategory::Network,
            Self::ValidationError { .. }
            | Self::UnsupportedCurrency { .. }
            | Self::RateUnavailable { .. } => ErrorCategory::Validation,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::High,
            // 網路或上游問題通常可重試
            ErrorCategory::Network | ErrorCategory::Upstream => match self {
                Self::AuthError => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Caller supplied something wrong; the HTTP layer answers 400 for these.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError { .. } | Self::UnsupportedCurrency { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::AuthError => "The TCMB API rejected the API key".to_string(),
            Self::UpstreamError { status, .. } => {
                format!("The TCMB API answered with status {}", status)
            }
            Self::EmptyResponse => "The TCMB API returned no data".to_string(),
            Self::ConnectivityError { .. } => "Could not reach the TCMB API".to_string(),
            Self::MissingConfigError { field } => format!("'{}' is not configured", field),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::AuthError => {
                "Set TCMB_API_KEY to a valid key from https://evds2.tcmb.gov.tr/ and run `check-key`"
            }
            Self::UpstreamError { .. } | Self::EmptyResponse => {
                "Try again later or narrow the requested date range"
            }
            Self::ConnectivityError { .. } => {
                "Check your internet connection and the configured upstream base_url"
            }
            Self::ValidationError { .. } => "Check the command arguments and date formats (YYYY-MM-DD)",
            Self::UnsupportedCurrency { .. } => "Run `currencies` to list the supported codes",
            Self::RateUnavailable { .. } => "Fetch current rates for both currencies first",
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Review the TOML configuration file",
            Self::IoError(_) | Self::SerializationError(_) => {
                "Check file permissions and free disk space"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RatesError>;
