use tracing_subscriber::EnvFilter;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::bootstrap::build_http_state;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::start_server;

/// `RUST_LOG` wins over the configured filter when set.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Loads configuration and serves the lookup API until shutdown.
pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;
    init_tracing(&config.log_filter);

    let state = build_http_state(&config);
    let server = start_server(state, config.bind_addr())
        .map_err(|e| AppError::Internal(format!("Failed to start HTTP server: {}", e)))?;

    server.await?;
    Ok(())
}
