use crate::core::Observation;
use crate::domain::catalog::{CurrencyCode, SeriesId};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// 日期欄位，依優先順序
pub const DATE_KEYS: [&str; 4] = ["Tarih", "tarih", "DATE", "date"];

static DECIMAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Current-rate lookups: the key scan only matches series segment or currency code.
    Latest,
    /// Date-range lookups: the key scan also accepts any key mentioning VALUE or RATE.
    Timeline,
}

/// Which series an observation belongs to; drives the key fallbacks.
#[derive(Debug, Clone, Copy)]
pub struct SeriesContext<'a> {
    pub series: &'a SeriesId,
    pub currency: CurrencyCode,
    pub mode: ExtractMode,
}

impl<'a> SeriesContext<'a> {
    pub fn new(series: &'a SeriesId, currency: CurrencyCode, mode: ExtractMode) -> Self {
        Self {
            series,
            currency,
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub rate: f64,
    pub date: Option<String>,
}

/// Ways of finding the rate inside one observation, tried in `PRIORITY` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueLocator {
    LowerValue,
    UpperValue,
    UnderscoredSeries,
    LiteralSeries,
    KeyScan,
}

impl ValueLocator {
    pub const PRIORITY: [ValueLocator; 5] = [
        ValueLocator::LowerValue,
        ValueLocator::UpperValue,
        ValueLocator::UnderscoredSeries,
        ValueLocator::LiteralSeries,
        ValueLocator::KeyScan,
    ];

    /// Exact-key locators skip empty values so the next one gets a chance.
    /// The key scan returns whatever the first matching key holds.
    pub fn locate<'o>(self, observation: &'o Observation, ctx: &SeriesContext<'_>) -> Option<&'o Value> {
        let exact = |key: &str| observation.get(key).filter(|value| !is_empty_value(value));

        match self {
            ValueLocator::LowerValue => exact("value"),
            ValueLocator::UpperValue => exact("VALUE"),
            ValueLocator::UnderscoredSeries => exact(&ctx.series.underscored()),
            ValueLocator::LiteralSeries => exact(ctx.series.as_str()),
            ValueLocator::KeyScan => {
                let segment = ctx.series.last_segment();
                let currency = ctx.currency.as_str();

                observation
                    .fields
                    .iter()
                    .find(|(key, _)| {
                        if key.contains(segment) || key.contains(currency) {
                            return true;
                        }
                        match ctx.mode {
                            ExtractMode::Latest => false,
                            ExtractMode::Timeline => {
                                let upper = key.to_uppercase();
                                upper.contains("VALUE") || upper.contains("RATE")
                            }
                        }
                    })
                    .map(|(_, value)| value)
            }
        }
    }
}

/// Locate and parse the rate of one observation. `None` means "skip this record".
pub fn extract(observation: &Observation, ctx: &SeriesContext<'_>) -> Option<Extraction> {
    let candidate = ValueLocator::PRIORITY
        .into_iter()
        .find_map(|locator| locator.locate(observation, ctx))?;

    let rate = parse_rate(candidate)?;

    Some(Extraction {
        rate,
        date: extract_date(observation),
    })
}

/// 依 `DATE_KEYS` 順序取第一個非空日期
pub fn extract_date(observation: &Observation) -> Option<String> {
    DATE_KEYS.iter().find_map(|key| match observation.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    })
}

/// Numbers are taken as-is; strings are read up to the longest decimal prefix,
/// so `"30.12 "` and `"30.12abc"` both parse. Non-finite results are rejected.
pub fn parse_rate(value: &Value) -> Option<f64> {
    let rate = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let prefix = DECIMAL_PREFIX.find(s.trim_start())?;
            prefix.as_str().parse::<f64>().ok()?
        }
        _ => return None,
    };

    rate.is_finite().then_some(rate)
}

/// 上游常見的「沒有值」：null、空字串、false、0
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f == 0.0 || f.is_nan()),
        Value::Array(_) | Value::Object(_) => false,
    }
}
