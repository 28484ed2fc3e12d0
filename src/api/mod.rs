//! HTTP surface over the classifier.

pub mod errors;
pub mod handlers;
pub mod multipart;
pub mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::classifier::Classifier;
use crate::config::Config;

pub use errors::{ApiError, ErrorResponse};

#[derive(Clone)]
pub struct AppState {
    pub classifier: Classifier,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(classifier: Classifier, config: Config) -> Self {
        Self {
            classifier,
            config: Arc::new(config),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/classes", get(handlers::classes_handler))
        .route("/load-model", post(handlers::load_model_handler))
        .route("/predict", post(handlers::predict_disaster_handler))
        .route("/predict-disaster", post(handlers::predict_disaster_handler))
        .route("/predict-damage", post(handlers::predict_damage_handler))
        .route("/predict-both", post(handlers::predict_both_handler))
        .route("/predict-batch", post(handlers::predict_batch_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
