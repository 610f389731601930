use super::controller;
use super::AppState;
use axum::routing::get;
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(controller::health))
        .route("/api/test-key", get(controller::test_key))
        .route("/api/currencies", get(controller::list_currencies))
        .route("/api/rates/current", get(controller::current_rates))
        .route("/api/rates/historical", get(controller::historical_rates))
        .route("/api/convert", get(controller::convert))
        .with_state(state)
}
