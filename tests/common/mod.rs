#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use traffic_predictor::{
    encoder::CategoricalEncoder, model::Forest, scaler::StandardScaler, ArtifactPaths, ArtifactStore,
    Pipeline, TrafficInput,
};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/models")
}

pub fn fixture_bytes(name: &str) -> Vec<u8> {
    std::fs::read(fixtures_dir().join(name)).expect("fixture present")
}

pub fn fixture_store() -> ArtifactStore {
    ArtifactStore::load(&ArtifactPaths::in_dir(&fixtures_dir())).expect("fixture artifacts load")
}

pub fn fixture_pipeline() -> Pipeline {
    Pipeline::new(Arc::new(fixture_store()))
}

pub fn fixture_forest() -> Forest {
    Forest::from_slice(&fixture_bytes("accident_severity_model.json")).unwrap()
}

pub fn fixture_encoder() -> CategoricalEncoder {
    CategoricalEncoder::from_slice(&fixture_bytes("label_encoders.json")).unwrap()
}

pub fn fixture_scaler() -> StandardScaler {
    StandardScaler::from_slice(&fixture_bytes("scaler.json")).unwrap()
}

/// Los Angeles, clear day, 8am.
pub fn la_morning() -> TrafficInput {
    TrafficInput {
        start_lat: 34.05,
        start_lng: -118.25,
        distance_mi: 0.5,
        city: "Los Angeles".into(),
        state: "CA".into(),
        temperature_f: 70.0,
        humidity: 40.0,
        pressure: 29.9,
        visibility: 10.0,
        wind_speed: 5.0,
        weather_condition: "Clear".into(),
        sunrise_sunset: "Day".into(),
        traffic_signal: 1,
        hour: 8,
        month: 6,
        year: 2023,
    }
}
