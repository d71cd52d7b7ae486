//! The immutable bundle of trained artifacts, loaded once at startup and shared by every request.

use std::path::{Path, PathBuf};

use crate::encoder::CategoricalEncoder;
use crate::error::ArtifactLoadError;
use crate::features::{CATEGORICAL_COLUMNS, FEATURE_COLUMNS};
use crate::labels;
use crate::model::{self, Classifier};
use crate::scaler::StandardScaler;

pub const MODEL_FILE: &str = "accident_severity_model.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const SCALER_FILE: &str = "scaler.json";

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoders: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE),
            encoders: dir.join(ENCODERS_FILE),
            scaler: dir.join(SCALER_FILE),
        }
    }
}

fn read(artifact: &'static str, path: &Path) -> Result<Vec<u8>, ArtifactLoadError> {
    std::fs::read(path).map_err(|source| ArtifactLoadError::Read {
        artifact,
        path: path.to_path_buf(),
        source,
    })
}

pub struct ArtifactStore {
    classifier: Box<dyn Classifier>,
    encoder: CategoricalEncoder,
    scaler: StandardScaler,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("n_features", &self.classifier.n_features())
            .field("classes", &self.classifier.classes())
            .field("scaler", &self.scaler)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    pub fn new(classifier: Box<dyn Classifier>, encoder: CategoricalEncoder, scaler: StandardScaler) -> Self {
        Self {
            classifier,
            encoder,
            scaler,
        }
    }

    /// Loads all three artifacts and checks the classifier against the feature schema.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let encoder = CategoricalEncoder::from_slice(&read("label encoders", &paths.encoders)?)?;
        for col in CATEGORICAL_COLUMNS {
            if let Some(v) = encoder.vocabulary(col) {
                tracing::info!("vocabulary {} size={}", col, v.len());
            }
        }

        let scaler = StandardScaler::from_slice(&read("scaler", &paths.scaler)?)?;
        let classifier = model::load_classifier(&paths.model)?;

        if classifier.n_features() != FEATURE_COLUMNS.len() {
            return Err(ArtifactLoadError::invalid(
                "classifier",
                format!(
                    "expects {} features, schema has {}",
                    classifier.n_features(),
                    FEATURE_COLUMNS.len()
                ),
            ));
        }

        let unlabeled: Vec<i64> = classifier
            .classes()
            .into_iter()
            .filter(|c| !labels::is_known(*c))
            .collect();
        if !unlabeled.is_empty() {
            tracing::warn!("classifier can emit classes without a label: {:?}", unlabeled);
        }

        let store = Self::new(classifier, encoder, scaler);
        store.warmup()?;
        Ok(store)
    }

    /// One forward pass on a zero row so a broken classifier fails at startup.
    pub fn warmup(&self) -> Result<(), ArtifactLoadError> {
        let n = self.classifier.n_features();
        self.classifier
            .predict(&vec![0.0; n])
            .map_err(|e| ArtifactLoadError::invalid("classifier", format!("warmup failed: {e}")))?;
        tracing::info!("warmup forward ok");
        Ok(())
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn encoder(&self) -> &CategoricalEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}
