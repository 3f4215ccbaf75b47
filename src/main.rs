use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use trainer_service::{build_app, config::AppConfig, run_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config);
    let app = build_app(state);

    run_server(app, config.port)
        .await
        .with_context(|| format!("server on port {} failed", config.port))
}
