use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use traffic_predictor::{
    config::ServerConfig,
    features::FEATURE_COLUMNS,
    server::{self, AppState},
    ArtifactPaths, ArtifactStore, Pipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ServerConfig::from_env();
    let paths = ArtifactPaths::in_dir(&cfg.models_dir);
    tracing::info!("loading artifacts from {}", cfg.models_dir.display());

    let store = ArtifactStore::load(&paths).with_context(|| {
        format!("failed to load model or preprocessors from {}", cfg.models_dir.display())
    })?;
    tracing::info!("model, encoders, and scaler loaded; feat_list[{}]: {:?}", FEATURE_COLUMNS.len(), FEATURE_COLUMNS);

    let state = AppState {
        pipeline: Pipeline::new(Arc::new(store)).with_feature_logging(cfg.log_features),
    };
    let app = server::router_with_ui(state, &cfg.static_dir);

    let addr = cfg.bind_addr()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
