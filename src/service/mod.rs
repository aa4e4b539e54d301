//! HTTP inference service.
//!
//! Exposes `POST /predict` and `GET /health` over a model loaded once at startup.

mod api;
mod error;
mod handlers;

use std::sync::Arc;

use log::{error, info};
use tokio::{net::TcpListener, signal};

pub use api::create_router;
pub use error::ServiceError;
pub use handlers::{HealthResponse, ModelInfo, PredictionResponse};

use crate::{config::ServeConfig, training::ModelArtifact};

/// Shared, read-only state of the service.
pub struct AppState {
    model: ModelArtifact,
}

impl AppState {
    pub fn new(model: ModelArtifact) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }
}

/// Loads the model and serves requests until ctrl-c.
///
/// # Errors
/// If the model can't be loaded or the address can't be bound.
pub async fn run_server(config: ServeConfig) -> anyhow::Result<()> {
    let model = ModelArtifact::load(&config.model_path).map_err(|e| {
        error!("failed to load model from {}: {e}", config.model_path.display());
        anyhow::anyhow!("could not load model: {e}")
    })?;
    info!(
        "loaded model from {} ({} trees, accuracy {:.4})",
        config.model_path.display(),
        model.forest().n_trees(),
        model.evaluation().accuracy
    );

    let state = Arc::new(AppState::new(model));
    let app = create_router(state, &config);

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    info!("listening at {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(e) => {
            error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    }
}
