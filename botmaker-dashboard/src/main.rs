use botmaker_dashboard::config;
use botmaker_dashboard::logging;
use botmaker_dashboard::module::templates::{ApiClient, SystemClock, TemplateCache};
use botmaker_dashboard::service::{self, AppState};

use anyhow::{Context, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = logging::init_logging(&config.log_dir, "botmaker-dashboard", &config.log_level)?;

    tracing::info!("BotMaker templates dashboard starting...");
    if config.api_url.is_empty() {
        tracing::warn!("{} is not set; every fetch will fail", config::API_URL_ENV);
    }

    let client = ApiClient::new(&config.api_url, &config.access_token, config.request_timeout())?;
    tracing::info!("Templates endpoint: {}", client.url());

    let cache = TemplateCache::new(Arc::new(client), Arc::new(SystemClock), config.cache_ttl());
    tracing::info!("Template cache TTL: {:?}", cache.ttl());

    let app = service::router(AppState::new(cache, config.columns.layout()));

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address()))?;
    tracing::info!("Dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received.");
        })
        .await?;

    Ok(())
}
