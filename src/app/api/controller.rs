use super::error::AppError;
use super::schema::{
    ApiResponse, ConversionView, ConvertQuery, CurrentRatesQuery, HealthResponse,
    HistoricalRatesQuery,
};
use super::AppState;
use crate::domain::catalog::parse_code_list;
use crate::domain::model::{ConversionSide, CurrencyInfo, KeyCheckReport, RateRecord};
use axum::extract::{Query, State};
use axum::Json;
use tracing::info;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "TCMB rates server is running",
    })
}

pub async fn test_key(State(state): State<AppState>) -> Result<Json<KeyCheckReport>, AppError> {
    let report = state.service.check_key().await?;
    info!(status = report.status, "🔑 API key check finished");
    Ok(Json(report))
}

pub async fn list_currencies(State(state): State<AppState>) -> Json<ApiResponse<Vec<CurrencyInfo>>> {
    Json(ApiResponse::ok(state.service.list_currencies()))
}

pub async fn current_rates(
    State(state): State<AppState>,
    Query(query): Query<CurrentRatesQuery>,
) -> Json<ApiResponse<Vec<RateRecord>>> {
    let requested = query
        .currencies
        .as_deref()
        .map(parse_code_list)
        .unwrap_or_default();
    let codes = if requested.is_empty() {
        state.default_currencies.clone()
    } else {
        requested
    };

    let rates = match &state.cache {
        Some(cache) => state.service.get_current_rates_cached(cache, &codes).await,
        None => state.service.get_current_rates(&codes).await,
    };

    Json(ApiResponse::ok(rates))
}

pub async fn historical_rates(
    State(state): State<AppState>,
    Query(query): Query<HistoricalRatesQuery>,
) -> Result<Json<ApiResponse<Vec<RateRecord>>>, AppError> {
    let (Some(currency), Some(start_date), Some(end_date)) = (
        non_empty(query.currency),
        non_empty(query.start_date),
        non_empty(query.end_date),
    ) else {
        return Err(AppError::bad_request(
            "currency, startDate, and endDate are required",
        ));
    };

    let rates = state
        .service
        .get_historical_rates(&currency, &start_date, &end_date)
        .await?;

    Ok(Json(ApiResponse::ok(rates)))
}

pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ApiResponse<ConversionView>>, AppError> {
    let (Some(amount), Some(from), Some(to)) = (
        non_empty(query.amount),
        non_empty(query.from),
        non_empty(query.to),
    ) else {
        return Err(AppError::bad_request("amount, from, and to are required"));
    };

    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request(format!("amount is not a number: {}", amount)))?;
    let from: ConversionSide = from.parse()?;
    let to: ConversionSide = to.parse()?;

    let conversion = state.service.convert(amount, from, to).await?;
    Ok(Json(ApiResponse::ok(conversion.into())))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
