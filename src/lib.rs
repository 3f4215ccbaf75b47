pub mod api;
pub mod config;
pub mod gemini;
pub mod page;
pub mod submission;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::{AppConfig, ConfigError};
use crate::gemini::{GeminiClient, TextModel};

/// Shared by every request. A missing credential halts the whole interface.
#[derive(Clone)]
pub enum AppState {
    Ready(Arc<dyn TextModel>),
    Halted(ConfigError),
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let client = config.credential().and_then(|api_key| {
            GeminiClient::new(api_key, &config.model, &config.base_url)
                .map_err(|err| ConfigError::ClientInit(err.to_string()))
        });
        Self::from_client(client)
    }

    fn from_client(client: Result<GeminiClient, ConfigError>) -> Self {
        match client {
            Ok(client) => {
                info!(model = client.model_name(), "model client ready");
                Self::Ready(Arc::new(client))
            }
            Err(err) => {
                error!(error = %err, "the form will not accept submissions");
                Self::Halted(err)
            }
        }
    }

    pub fn ready(model: impl TextModel + 'static) -> Self {
        Self::Ready(Arc::new(model))
    }
}

pub fn build_app(state: AppState) -> Router {
    api::router(state)
}

pub async fn run_server(app: Router, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
