use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::path::Path;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::pipeline::Pipeline;
use crate::types::{PredictResponse, TrafficInput, Welcome};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

// ---------- Handlers ----------

async fn home() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the Real-Time Traffic Prediction API 🚗",
        usage: "Send a POST request to /predict with input data.",
    })
}

// Failures are reported in the body with status "failed"; the HTTP status stays 200.
async fn predict(State(state): State<AppState>, Json(payload): Json<TrafficInput>) -> Json<PredictResponse> {
    Json(state.pipeline.respond(&payload))
}

fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .with_state(state)
}

pub fn router(state: AppState) -> Router {
    api_routes(state).layer(TraceLayer::new_for_http())
}

/// API routes plus the form UI at `/ui` and its assets under `/static`.
pub fn router_with_ui(state: AppState, static_dir: &Path) -> Router {
    api_routes(state)
        .route_service("/ui", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}
