use serde::{Deserialize, Serialize};

use crate::domain::catalog::CurrencyCode;

/// One upstream record of unknown shape, keys kept in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Observation {
    pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// 單一序列在一個日期區間內的觀測值，舊的在前
pub type ObservationSequence = Vec<Observation>;

/// The unit handed to the cache, the CLI and the HTTP layer.
///
/// In current-rate results both rates are always present; historical results
/// may carry `None` on either side for a date only one series reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    pub currency: CurrencyCode,
    pub buy_rate: Option<f64>,
    pub sell_rate: Option<f64>,
    /// `DD-MM-YYYY`
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInfo {
    pub code: CurrencyCode,
    pub name: String,
    pub name_en: String,
}

/// API key 檢查結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCheckReport {
    pub success: bool,
    pub status: u16,
    pub status_text: String,
    pub message: String,
    pub data: Option<String>,
}

/// 換算的一邊：土耳其里拉或目錄中的外幣
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConversionSide {
    Try,
    Foreign(CurrencyCode),
}

impl std::str::FromStr for ConversionSide {
    type Err = crate::utils::error::RatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if code == "TRY" {
            Ok(ConversionSide::Try)
        } else {
            code.parse::<CurrencyCode>().map(ConversionSide::Foreign)
        }
    }
}

impl std::fmt::Display for ConversionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionSide::Try => f.write_str("TRY"),
            ConversionSide::Foreign(code) => write!(f, "{}", code),
        }
    }
}

impl From<ConversionSide> for String {
    fn from(side: ConversionSide) -> Self {
        side.to_string()
    }
}

impl TryFrom<String> for ConversionSide {
    type Error = crate::utils::error::RatesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub from: ConversionSide,
    pub to: ConversionSide,
    pub amount: f64,
    pub result: f64,
    /// 顯示用的小數位數
    pub precision: usize,
}

impl Conversion {
    pub fn formatted(&self) -> String {
        format!("{:.*}", self.precision, self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_record_serializes_camel_case_with_nulls() {
        let record = RateRecord {
            currency: CurrencyCode::USD,
            buy_rate: Some(30.1),
            sell_rate: None,
            date: "01-01-2024".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currency": "USD",
                "buyRate": 30.1,
                "sellRate": null,
                "date": "01-01-2024"
            })
        );
    }

    #[test]
    fn test_conversion_side_parsing() {
        assert_eq!("try".parse::<ConversionSide>().unwrap(), ConversionSide::Try);
        assert_eq!(
            " eur ".parse::<ConversionSide>().unwrap(),
            ConversionSide::Foreign(CurrencyCode::EUR)
        );
        assert!("XYZ".parse::<ConversionSide>().is_err());
    }
}
