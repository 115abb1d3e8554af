//! Prediction server
//!
//! `GET /health` and `POST /predict` over a bundle of artifacts loaded once
//! at startup.

mod api;
mod error;
mod handlers;
mod state;
pub mod schema;

pub use api::create_router;
pub use error::ServerError;
pub use schema::{HousingRecord, PredictionRequest, PredictionResponse};
pub use state::AppState;

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{env_path, DEFAULT_ARTIFACT_DIR, DEFAULT_LOG_DIR};
use crate::inference::load_artifacts;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifact_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            artifact_dir: env_path("HOUSING_ARTIFACT_DIR", DEFAULT_ARTIFACT_DIR),
            log_dir: env_path("HOUSING_LOG_DIR", DEFAULT_LOG_DIR),
        }
    }
}

impl ServerConfig {
    pub fn api_log_path(&self) -> PathBuf {
        self.log_dir.join("api.log")
    }
}

/// Load artifacts, then serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let bundle = load_artifacts(&config.artifact_dir).with_context(|| {
        format!(
            "cannot serve without trained artifacts in {} (run `housing train` first)",
            config.artifact_dir.display()
        )
    })?;

    let state = Arc::new(AppState::with_artifacts(bundle));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        artifacts = %config.artifact_dir.display(),
        started_at = %start_time.to_rfc3339(),
        "Prediction server listening"
    );

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install ctrl+c handler, running until killed");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(uptime_secs = uptime.num_seconds(), "Shutdown signal received, stopping server gracefully");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
