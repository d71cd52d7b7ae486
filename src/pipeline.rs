use std::sync::Arc;

use crate::artifacts::ArtifactStore;
use crate::error::PipelineResult;
use crate::features::{FeatureAssembler, NormalizedRecord};
use crate::labels;
use crate::types::{PredictResponse, TrafficInput};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub code: i64,
    pub category: &'static str,
    /// Categorical columns that fell back to the sentinel code.
    pub unseen: Vec<&'static str>,
}

/// Assemble → encode → normalize → classify → resolve, against a shared read-only store.
#[derive(Debug, Clone)]
pub struct Pipeline {
    store: Arc<ArtifactStore>,
    assembler: FeatureAssembler,
    log_features: bool,
}

impl Pipeline {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self {
            store,
            assembler: FeatureAssembler::default(),
            log_features: false,
        }
    }

    pub fn with_assembler(mut self, assembler: FeatureAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_feature_logging(mut self, on: bool) -> Self {
        self.log_features = on;
        self
    }

    /// Runs every stage up to the classifier input.
    pub fn prepare(&self, input: &TrafficInput) -> PipelineResult<(NormalizedRecord, Vec<&'static str>)> {
        let assembled = self.assembler.assemble(input)?;
        let (encoded, unseen) = self.store.encoder().encode(assembled)?;
        let normalized = self.store.scaler().normalize(encoded)?;
        Ok((normalized, unseen))
    }

    pub fn predict(&self, input: &TrafficInput) -> PipelineResult<Prediction> {
        let (normalized, unseen) = self.prepare(input)?;
        if self.log_features {
            log_vector(&normalized);
        }

        let code = self.store.classifier().predict(normalized.values())?;
        let category = labels::resolve(code);
        if !labels::is_known(code) {
            tracing::debug!(code, "class index outside label table");
        }

        Ok(Prediction {
            code,
            category,
            unseen,
        })
    }

    /// Request boundary: every stage error ends here as a `failed` response.
    pub fn respond(&self, input: &TrafficInput) -> PredictResponse {
        match self.predict(input) {
            Ok(p) => {
                tracing::info!(code = p.code, unseen = ?p.unseen, "prediction successful: {}", p.category);
                PredictResponse::success(p.code, p.category)
            }
            Err(e) => {
                tracing::error!("prediction error: {}", e);
                PredictResponse::failed(e.to_string())
            }
        }
    }
}

fn log_vector(rec: &NormalizedRecord) {
    let v = rec.values();
    let nz = v.iter().filter(|x| **x != 0.0).count();
    let mean = if v.is_empty() { 0.0 } else { v.iter().sum::<f64>() / v.len() as f64 };
    let std = if v.len() < 2 {
        0.0
    } else {
        (v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / v.len() as f64).sqrt()
    };
    let sample: Vec<String> = rec
        .columns()
        .iter()
        .zip(v)
        .take(6)
        .map(|(name, x)| format!("{}={:.3}", name, x))
        .collect();
    tracing::info!(
        "features in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
        v.len(),
        nz,
        mean,
        std,
        sample.join(", ")
    );
}
