use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::model::CurrencyInfo;
use crate::utils::error::RatesError;

/// 央行提供買賣匯率的貨幣
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyCode {
    USD,
    EUR,
    CHF,
    GBP,
    JPY,
    AUD,
    CAD,
    SEK,
    NOK,
    DKK,
    SAR,
    KWD,
    QAR,
    BGN,
    RON,
    RUB,
    CNY,
    PKR,
    IRR,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 19] = [
        CurrencyCode::USD,
        CurrencyCode::EUR,
        CurrencyCode::CHF,
        CurrencyCode::GBP,
        CurrencyCode::JPY,
        CurrencyCode::AUD,
        CurrencyCode::CAD,
        CurrencyCode::SEK,
        CurrencyCode::NOK,
        CurrencyCode::DKK,
        CurrencyCode::SAR,
        CurrencyCode::KWD,
        CurrencyCode::QAR,
        CurrencyCode::BGN,
        CurrencyCode::RON,
        CurrencyCode::RUB,
        CurrencyCode::CNY,
        CurrencyCode::PKR,
        CurrencyCode::IRR,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::USD => "USD",
            CurrencyCode::EUR => "EUR",
            CurrencyCode::CHF => "CHF",
            CurrencyCode::GBP => "GBP",
            CurrencyCode::JPY => "JPY",
            CurrencyCode::AUD => "AUD",
            CurrencyCode::CAD => "CAD",
            CurrencyCode::SEK => "SEK",
            CurrencyCode::NOK => "NOK",
            CurrencyCode::DKK => "DKK",
            CurrencyCode::SAR => "SAR",
            CurrencyCode::KWD => "KWD",
            CurrencyCode::QAR => "QAR",
            CurrencyCode::BGN => "BGN",
            CurrencyCode::RON => "RON",
            CurrencyCode::RUB => "RUB",
            CurrencyCode::CNY => "CNY",
            CurrencyCode::PKR => "PKR",
            CurrencyCode::IRR => "IRR",
        }
    }

    /// (土耳其文名稱, 英文名稱)
    fn names(&self) -> (&'static str, &'static str) {
        match self {
            CurrencyCode::USD => ("ABD Doları", "US Dollar"),
            CurrencyCode::EUR => ("Euro", "Euro"),
            CurrencyCode::CHF => ("İsviçre Frangı", "Swiss Franc"),
            CurrencyCode::GBP => ("İngiliz Sterlini", "British Pound"),
            CurrencyCode::JPY => ("Japon Yeni", "Japanese Yen"),
            CurrencyCode::AUD => ("Avustralya Doları", "Australian Dollar"),
            CurrencyCode::CAD => ("Kanada Doları", "Canadian Dollar"),
            CurrencyCode::SEK => ("İsveç Kronu", "Swedish Krona"),
            CurrencyCode::NOK => ("Norveç Kronu", "Norwegian Krone"),
            CurrencyCode::DKK => ("Danimarka Kronu", "Danish Krone"),
            CurrencyCode::SAR => ("Suudi Arabistan Riyali", "Saudi Riyal"),
            CurrencyCode::KWD => ("Kuveyt Dinarı", "Kuwaiti Dinar"),
            CurrencyCode::QAR => ("Katar Riyali", "Qatari Riyal"),
            CurrencyCode::BGN => ("Bulgar Levası", "Bulgarian Lev"),
            CurrencyCode::RON => ("Rumen Leyi", "Romanian Leu"),
            CurrencyCode::RUB => ("Rus Rublesi", "Russian Ruble"),
            CurrencyCode::CNY => ("Çin Yuanı", "Chinese Yuan"),
            CurrencyCode::PKR => ("Pakistan Rupisi", "Pakistani Rupee"),
            CurrencyCode::IRR => ("İran Riyali", "Iranian Rial"),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = RatesError;

    /// Codes are matched exactly; callers that accept lowercase input uppercase it first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| RatesError::UnsupportedCurrency {
                code: s.to_string(),
            })
    }
}

/// 上游的序列代碼，例如 `TP.DK.USD.A`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId(String);

impl SeriesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `TP.DK.USD.A` -> `TP_DK_USD_A`，上游有時用這個當 JSON key
    pub fn underscored(&self) -> String {
        self.0.replace('.', "_")
    }

    /// `TP.DK.USD.A` -> `A`
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub code: CurrencyCode,
    pub buy: SeriesId,
    pub sell: SeriesId,
    pub name: &'static str,
    pub name_en: &'static str,
}

/// Immutable currency -> series lookup, built once at startup and handed to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCatalog {
    entries: Vec<SeriesEntry>,
}

impl SeriesCatalog {
    /// EVDS 的 `TP.DK.{code}.A` (買入) / `TP.DK.{code}.S` (賣出) 序列
    pub fn tcmb() -> Self {
        let entries = CurrencyCode::ALL
            .iter()
            .map(|code| {
                let (name, name_en) = code.names();
                SeriesEntry {
                    code: *code,
                    buy: SeriesId::new(format!("TP.DK.{}.A", code)),
                    sell: SeriesId::new(format!("TP.DK.{}.S", code)),
                    name,
                    name_en,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn lookup(&self, code: CurrencyCode) -> Option<&SeriesEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    /// 字串代碼查詢；未知代碼回傳 None
    pub fn resolve(&self, code: &str) -> Option<&SeriesEntry> {
        code.parse::<CurrencyCode>()
            .ok()
            .and_then(|code| self.lookup(code))
    }

    pub fn currencies(&self) -> Vec<CurrencyInfo> {
        self.entries
            .iter()
            .map(|entry| CurrencyInfo {
                code: entry.code,
                name: entry.name.to_string(),
                name_en: entry.name_en.to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a comma separated list (`"usd, eur"`) into trimmed upper-case codes.
pub fn parse_code_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect()
}

impl Default for SeriesCatalog {
    fn default() -> Self {
        Self::tcmb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_maps_code_to_buy_and_sell_series() {
        let catalog = SeriesCatalog::tcmb();
        let usd = catalog.lookup(CurrencyCode::USD).unwrap();

        assert_eq!(usd.buy.as_str(), "TP.DK.USD.A");
        assert_eq!(usd.sell.as_str(), "TP.DK.USD.S");
        assert_eq!(usd.name_en, "US Dollar");
        assert_eq!(catalog.len(), 19);
    }

    #[test]
    fn test_currencies_listing_is_stable() {
        let catalog = SeriesCatalog::tcmb();
        let first = catalog.currencies();
        let second = catalog.currencies();

        assert_eq!(first, second);
        assert_eq!(first[0].code, CurrencyCode::USD);
        assert_eq!(first[1].code, CurrencyCode::EUR);
        assert_eq!(first[2].code, CurrencyCode::CHF);
        assert_eq!(first.last().unwrap().code, CurrencyCode::IRR);
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let catalog = SeriesCatalog::tcmb();
        assert!(catalog.resolve("EUR").is_some());
        assert!(catalog.resolve("eur").is_none());
        assert!(catalog.resolve("XYZ").is_none());
        assert!(catalog.resolve("").is_none());
    }

    #[test]
    fn test_parse_code_list() {
        assert_eq!(parse_code_list(" usd,EUR ,,chf"), vec!["USD", "EUR", "CHF"]);
        assert!(parse_code_list(" , ").is_empty());
    }

    #[test]
    fn test_series_id_helpers() {
        let id = SeriesId::new("TP.DK.USD.S");
        assert_eq!(id.underscored(), "TP_DK_USD_S");
        assert_eq!(id.last_segment(), "S");

        let bare = SeriesId::new("PLAIN");
        assert_eq!(bare.last_segment(), "PLAIN");
    }
}
