pub mod controller;
pub mod error;
pub mod route;
pub mod schema;

use crate::adapters::storage::LocalStorage;
use crate::core::cache::RatesCache;
use crate::core::rate_service::RateService;
use axum::http::{header, Method};
use axum::Router;
use route::register_routes;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RateService>,
    /// `currencies` 參數缺省時使用
    pub default_currencies: Vec<String>,
    pub cache: Option<Arc<RatesCache<LocalStorage>>>,
}

impl AppState {
    pub fn new(
        service: RateService,
        default_currencies: Vec<String>,
        cache: Option<RatesCache<LocalStorage>>,
    ) -> Self {
        Self {
            service: Arc::new(service),
            default_currencies,
            cache: cache.map(Arc::new),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    register_routes(state).layer(cors)
}
