use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use disaster_vision::api::{start_server, AppState};
use disaster_vision::{Axis, Classifier, Config, ScorerRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::new();
    let addr = config
        .bind_address()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let registry = Arc::new(ScorerRegistry::new(config.device_id));
    for axis in Axis::ALL {
        let path = config.model_path(axis).clone();
        let loader = Arc::clone(&registry);
        let loaded = tokio::task::spawn_blocking(move || loader.load(axis, &path))
            .await
            .context("model preload task panicked")?;
        match loaded {
            Ok(resolution) => info!(%axis, ?resolution, "model ready"),
            Err(e) => warn!(%axis, error = %e, "model unavailable; load it later via /load-model"),
        }
    }

    let state = AppState::new(Classifier::new(registry), config);
    start_server(state, addr).await?;
    Ok(())
}
