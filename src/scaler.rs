use serde::Deserialize;

use crate::error::{ArtifactLoadError, PipelineError, PipelineResult};
use crate::features::{EncodedRecord, NormalizedRecord, Record, NUMERIC_COLUMNS};

const ARTIFACT: &str = "scaler";

#[derive(Deserialize)]
struct ScalerJson {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
}

/// Standard scaler: `(x - mean) / scale`, parameters positional against `NUMERIC_COLUMNS`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Parameters are taken in `NUMERIC_COLUMNS` order. A zero scale acts as 1.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactLoadError> {
        let n = NUMERIC_COLUMNS.len();
        if mean.len() != n || scale.len() != n {
            return Err(ArtifactLoadError::invalid(
                ARTIFACT,
                format!("expected {n} parameters, got mean={} scale={}", mean.len(), scale.len()),
            ));
        }
        if let Some(i) = mean.iter().chain(scale.iter()).position(|x| !x.is_finite()) {
            return Err(ArtifactLoadError::invalid(
                ARTIFACT,
                format!("non-finite parameter for `{}`", NUMERIC_COLUMNS[i % n]),
            ));
        }
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }

    pub fn identity() -> Self {
        let n = NUMERIC_COLUMNS.len();
        Self {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactLoadError> {
        let raw: ScalerJson = serde_json::from_slice(bytes)
            .map_err(|source| ArtifactLoadError::Decode { artifact: ARTIFACT, source })?;

        if let Some(names) = &raw.feature_names {
            if names.iter().map(String::as_str).ne(NUMERIC_COLUMNS.iter().copied()) {
                return Err(ArtifactLoadError::invalid(
                    ARTIFACT,
                    format!("fitted columns {names:?} do not match {NUMERIC_COLUMNS:?}"),
                ));
            }
        }

        let n = NUMERIC_COLUMNS.len();
        let mean = raw.mean.unwrap_or_else(|| vec![0.0; n]);
        let scale = raw.scale.unwrap_or_else(|| vec![1.0; n]);
        Self::new(mean, scale)
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Vector form of the transform. `x` must be in fitted order.
    pub fn transform(&self, x: &[f64]) -> PipelineResult<Vec<f64>> {
        if x.len() != self.mean.len() {
            return Err(PipelineError::SchemaMismatch(format!(
                "scaler expects {} numeric features, got {}",
                self.mean.len(),
                x.len()
            )));
        }
        Ok(x
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }

    /// Gathers the numeric columns in fitted order, scales them together, scatters them back.
    pub fn normalize(&self, record: EncodedRecord) -> PipelineResult<NormalizedRecord> {
        let Record { columns, mut values, .. } = record;

        let mut slots = Vec::with_capacity(NUMERIC_COLUMNS.len());
        for col in NUMERIC_COLUMNS {
            let i = columns.iter().position(|c| *c == col).ok_or_else(|| {
                PipelineError::SchemaMismatch(format!("numeric feature `{col}` missing from record"))
            })?;
            slots.push(i);
        }

        let gathered: Vec<f64> = slots.iter().map(|&i| values[i]).collect();
        let scaled = self.transform(&gathered)?;
        for (&i, v) in slots.iter().zip(scaled) {
            values[i] = v;
        }

        Ok(Record::new(columns, values))
    }
}
