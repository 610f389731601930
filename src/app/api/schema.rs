use crate::domain::model::Conversion;
use serde::{Deserialize, Serialize};

/// `{"success": true, "data": ...}` 或 `{"success": false, "error": "..."}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CurrentRatesQuery {
    pub currencies: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRatesQuery {
    pub currency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// amount 以字串接收，解析錯誤才能包成統一格式
#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversionView {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub result: f64,
    pub formatted: String,
}

impl From<Conversion> for ConversionView {
    fn from(conversion: Conversion) -> Self {
        Self {
            from: conversion.from.to_string(),
            to: conversion.to.to_string(),
            amount: conversion.amount,
            result: conversion.result,
            formatted: conversion.formatted(),
        }
    }
}
