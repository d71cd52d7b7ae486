//! HTTP boundary tests: routes, response shapes, and validation rejections.

mod common;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::*;
use traffic_predictor::{
    model::Forest,
    server::{router, router_with_ui, AppState},
    ArtifactStore, Pipeline,
};

fn app() -> Router {
    router(AppState {
        pipeline: fixture_pipeline(),
    })
}

fn la_body() -> Value {
    json!({
        "Start_Lat": 34.05, "Start_Lng": -118.25, "Distance_mi": 0.5,
        "City": "Los Angeles", "State": "CA",
        "Temperature_F": 70, "Humidity": 40, "Pressure": 29.9, "Visibility": 10, "Wind_Speed": 5,
        "Weather_Condition": "Clear", "Sunrise_Sunset": "Day",
        "Traffic_Signal": 1, "Hour": 8, "Month": 6, "Year": 2023
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn home_returns_welcome() {
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    assert_eq!(v["message"], "Welcome to the Real-Time Traffic Prediction API 🚗");
    assert_eq!(v["usage"], "Send a POST request to /predict with input data.");
}

#[tokio::test]
async fn predict_known_values() {
    let resp = app().oneshot(post_json("/predict", &la_body())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"prediction_code": 0, "category": "Low Congestion", "status": "success"})
    );
}

#[tokio::test]
async fn predict_unseen_city() {
    let mut body = la_body();
    body["City"] = json!("Atlantis");
    let resp = app().oneshot(post_json("/predict", &body)).await.unwrap();
    let v = body_json(resp).await;
    assert_eq!(v["status"], "success");
    assert!(v["prediction_code"].is_i64());
    assert!(v["category"].is_string());
}

#[tokio::test]
async fn missing_field_is_rejected_before_pipeline() {
    let mut body = la_body();
    body.as_object_mut().unwrap().remove("Year");
    let resp = app().oneshot(post_json("/predict", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn wrong_type_is_rejected_before_pipeline() {
    let mut body = la_body();
    body["Hour"] = json!("eight");
    let resp = app().oneshot(post_json("/predict", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn pipeline_failure_is_reported_in_body() {
    // a 15-wide classifier never matches the 16-column record
    let narrow = json!({
        "n_features": 15,
        "classes": [0],
        "trees": [{"nodes": [{"value": [1.0]}]}]
    });
    let forest = Forest::from_slice(narrow.to_string().as_bytes()).unwrap();
    let store = ArtifactStore::new(Box::new(forest), fixture_encoder(), fixture_scaler());
    let app = router(AppState {
        pipeline: Pipeline::new(Arc::new(store)),
    });

    let resp = app.oneshot(post_json("/predict", &la_body())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["status"], "failed");
    assert!(v["error"].as_str().unwrap().contains("feature length mismatch"));
    assert!(v.get("prediction_code").is_none());
}

#[tokio::test]
async fn concurrent_requests_agree() {
    let app = app();
    let reqs = (0..16).map(|_| app.clone().oneshot(post_json("/predict", &la_body())));
    let resps = futures::future::join_all(reqs).await;

    for r in resps {
        let v = body_json(r.unwrap()).await;
        assert_eq!(v["prediction_code"], 0);
    }
}

#[tokio::test]
async fn ui_is_served_from_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>form</html>").unwrap();
    std::fs::write(dir.path().join("script.js"), "// js").unwrap();
    let app = router_with_ui(
        AppState {
            pipeline: fixture_pipeline(),
        },
        dir.path(),
    );

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/ui").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(Request::builder().uri("/static/script.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
