use anyhow::Context;
use tcmb_rates::app::api::{build_router, AppState};
use tcmb_rates::core::ConfigProvider;
use tcmb_rates::utils::{logger, logger::mask_secret, validation::Validate};
use tcmb_rates::{rate_service, rates_cache, RatesConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("TCMB_RATES_CONFIG").ok();
    let config = RatesConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    logger::init_server_logger(config.json_logs());
    config.validate().context("invalid configuration")?;

    match config.api_key() {
        Some(key) => info!(api_key = %mask_secret(key), "using configured API key"),
        None => warn!("no TCMB API key configured; rate lookups will fail until TCMB_API_KEY is set"),
    }

    let bind_addr = config.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        bind_addr = %bind_addr,
        upstream = %config.base_url(),
        cache_enabled = config.cache_enabled(),
        concurrent_requests = config.concurrent_requests(),
        "🚀 rates-server started"
    );

    let state = AppState::new(
        rate_service(&config),
        config.default_currencies(),
        rates_cache(&config),
    );
    let app = build_router(state);

    axum::serve(listener, app).await.context("server runtime error")?;
    Ok(())
}
