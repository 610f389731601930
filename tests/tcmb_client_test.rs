use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;
use tcmb_rates::core::RateSource;
use tcmb_rates::domain::catalog::SeriesId;
use tcmb_rates::domain::date::DateRange;
use tcmb_rates::{RatesConfig, RatesError, TcmbClient};

fn config(base_url: String) -> RatesConfig {
    let mut config = RatesConfig::default();
    config.upstream.base_url = base_url;
    config.upstream.api_key = Some("test-key".to_string());
    config
}

fn january() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
}

#[tokio::test]
async fn test_fetch_series_sends_key_header_and_dates() {
    let server = MockServer::start();
    let payload = json!({"items": [{"Tarih": "02-01-2024", "TP_DK_USD_A": "30.1"}]});

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("series=TP.DK.USD.A")
            .path_contains("startDate=01-01-2024")
            .path_contains("endDate=31-01-2024")
            .path_contains("type=json")
            .header("key", "test-key")
            .header("Accept", "application/json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(payload.clone());
    });

    let client = TcmbClient::new(config(server.base_url()));
    let body = client
        .fetch_series(&SeriesId::new("TP.DK.USD.A"), &january())
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_forbidden_is_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("series=TP.DK.EUR.S");
        then.status(403).body("Forbidden");
    });

    let client = TcmbClient::new(config(server.base_url()));
    let err = client
        .fetch_series(&SeriesId::new("TP.DK.EUR.S"), &january())
        .await
        .unwrap_err();

    assert!(matches!(err, RatesError::AuthError));
}

#[tokio::test]
async fn test_other_status_carries_upstream_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("series=TP.DK.USD.A");
        then.status(500).body("maintenance");
    });

    let client = TcmbClient::new(config(server.base_url()));
    let err = client
        .fetch_series(&SeriesId::new("TP.DK.USD.A"), &january())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "TCMB API Error: 500 - maintenance");
}

#[tokio::test]
async fn test_empty_body_is_empty_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("series=TP.DK.USD.A");
        then.status(200).body("");
    });

    let client = TcmbClient::new(config(server.base_url()));
    let err = client
        .fetch_series(&SeriesId::new("TP.DK.USD.A"), &january())
        .await
        .unwrap_err();

    assert!(matches!(err, RatesError::EmptyResponse));
}

#[tokio::test]
async fn test_non_json_body_passes_through_as_text() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("series=TP.DK.USD.A");
        then.status(200).body("<html>maintenance</html>");
    });

    let client = TcmbClient::new(config(server.base_url()));
    let body = client
        .fetch_series(&SeriesId::new("TP.DK.USD.A"), &january())
        .await
        .unwrap();

    assert_eq!(body, json!("<html>maintenance</html>"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_connectivity_error() {
    let client = TcmbClient::new(config("http://127.0.0.1:1".to_string()));
    let err = client
        .fetch_series(&SeriesId::new("TP.DK.USD.A"), &january())
        .await
        .unwrap_err();

    assert!(matches!(err, RatesError::ConnectivityError { .. }));
}

#[tokio::test]
async fn test_check_key_reports_success() {
    let server = MockServer::start();
    let key_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("series=TP.DK.USD.S")
            .header("key", "test-key");
        then.status(200).body("[]");
    });

    let client = TcmbClient::new(config(server.base_url()));
    let report = client.check_key().await.unwrap();

    key_mock.assert();
    assert!(report.success);
    assert_eq!(report.status, 200);
    assert_eq!(report.status_text, "OK");
    assert_eq!(report.data.as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_check_key_reports_rejection_without_failing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("series=TP.DK.USD.S");
        then.status(403).body("x".repeat(800));
    });

    let client = TcmbClient::new(config(server.base_url()));
    let report = client.check_key().await.unwrap();

    assert!(!report.success);
    assert_eq!(report.status, 403);
    assert!(report.message.contains("invalid"));
    assert_eq!(report.data.map(|d| d.len()), Some(500));
}

#[tokio::test]
async fn test_check_key_unexpected_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("series=TP.DK.USD.S");
        then.status(502);
    });

    let client = TcmbClient::new(config(server.base_url()));
    let report = client.check_key().await.unwrap();

    assert!(!report.success);
    assert_eq!(report.message, "Unexpected status: 502");
    assert_eq!(report.data, None);
}
