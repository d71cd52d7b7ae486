use serde::Deserialize;
use std::path::Path;

use crate::error::{ArtifactLoadError, PipelineError, PipelineResult};
use crate::features::FEATURE_COLUMNS;

const ARTIFACT: &str = "classifier";

/// Maps one ordered feature row to a class index. Shared across requests, so `&self` only.
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// Every index `predict` can return.
    fn classes(&self) -> Vec<i64>;

    fn predict(&self, row: &[f64]) -> PipelineResult<i64>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walks from the root; `x <= threshold` goes left.
    fn leaf(&self, row: &[f64]) -> PipelineResult<&[f64]> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = *row.get(*feature).ok_or_else(|| {
                        PipelineError::Failure(format!("split on feature {feature} outside input"))
                    })?;
                    idx = if x <= *threshold { *left } else { *right };
                }
                Some(Node::Leaf { value }) => return Ok(value.as_slice()),
                None => return Err(PipelineError::Failure(format!("tree node {idx} out of range"))),
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ForestJson {
    n_features: usize,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    classes: Vec<i64>,
    trees: Vec<Tree>,
}

/// Tree ensemble voting by averaged leaf probabilities.
#[derive(Debug, Clone)]
pub struct Forest {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<Tree>,
}

impl Forest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactLoadError> {
        let raw: ForestJson = serde_json::from_slice(bytes)
            .map_err(|source| ArtifactLoadError::Decode { artifact: ARTIFACT, source })?;

        if let Some(names) = &raw.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_COLUMNS.iter().copied()) {
                return Err(ArtifactLoadError::invalid(
                    ARTIFACT,
                    format!("trained on columns {names:?}, expected {FEATURE_COLUMNS:?}"),
                ));
            }
        }
        Self::new(raw.n_features, raw.classes, raw.trees)
    }

    pub fn new(n_features: usize, classes: Vec<i64>, trees: Vec<Tree>) -> Result<Self, ArtifactLoadError> {
        let bad = |reason: String| ArtifactLoadError::invalid(ARTIFACT, reason);

        if classes.is_empty() {
            return Err(bad("no classes".into()));
        }
        if trees.is_empty() {
            return Err(bad("no trees".into()));
        }
        for (t, tree) in trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(bad(format!("tree {t} has no nodes")));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= n_features {
                            return Err(bad(format!("tree {t} node {i}: feature {feature} >= {n_features}")));
                        }
                        if threshold.is_nan() {
                            return Err(bad(format!("tree {t} node {i}: NaN threshold")));
                        }
                        // children strictly after parent, so every walk terminates
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(bad(format!("tree {t} node {i}: bad child {child}")));
                            }
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != classes.len() {
                            return Err(bad(format!(
                                "tree {t} node {i}: leaf has {} weights for {} classes",
                                value.len(),
                                classes.len()
                            )));
                        }
                    }
                }
            }
        }

        Ok(Self {
            n_features,
            classes,
            trees,
        })
    }

    /// Mean per-class probability over all trees.
    pub fn predict_proba(&self, row: &[f64]) -> PipelineResult<Vec<f64>> {
        if row.len() != self.n_features {
            return Err(PipelineError::SchemaMismatch(format!(
                "feature length mismatch: got {}, expected {}",
                row.len(),
                self.n_features
            )));
        }

        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(row)?;
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                for (a, w) in acc.iter_mut().zip(leaf) {
                    *a += w / total;
                }
            }
        }
        let n = self.trees.len() as f64;
        acc.iter_mut().for_each(|a| *a /= n);
        Ok(acc)
    }
}

impl Classifier for Forest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> Vec<i64> {
        self.classes.clone()
    }

    fn predict(&self, row: &[f64]) -> PipelineResult<i64> {
        let proba = self.predict_proba(row)?;
        // first maximum wins ties
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok(self.classes[best])
    }
}

#[cfg(feature = "torch")]
pub use torch::TorchClassifier;

#[cfg(feature = "torch")]
mod torch {
    use super::*;
    use tch::{kind::Kind, CModule, Device, Tensor};

    /// TorchScript module emitting `[1, C]` class scores.
    pub struct TorchClassifier {
        model: CModule,
        device: Device,
        in_dim: usize,
        n_classes: i64,
    }

    impl TorchClassifier {
        pub fn load(path: &Path, in_dim: usize) -> Result<Self, ArtifactLoadError> {
            let device = Device::Cpu;
            let model = CModule::load_on_device(path, device).map_err(|source| ArtifactLoadError::Torch {
                path: path.to_path_buf(),
                source,
            })?;

            // Probe output shape with a dummy forward
            let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
            let out = model.forward_ts(&[dummy]).map_err(|source| ArtifactLoadError::Torch {
                path: path.to_path_buf(),
                source,
            })?;
            let sz = out.size();
            if sz.len() != 2 || sz[0] != 1 || sz[1] < 1 {
                return Err(ArtifactLoadError::invalid(
                    ARTIFACT,
                    format!("unexpected model output size: {sz:?}"),
                ));
            }

            Ok(Self {
                model,
                device,
                in_dim,
                n_classes: sz[1],
            })
        }
    }

    impl Classifier for TorchClassifier {
        fn n_features(&self) -> usize {
            self.in_dim
        }

        fn classes(&self) -> Vec<i64> {
            (0..self.n_classes).collect()
        }

        fn predict(&self, row: &[f64]) -> PipelineResult<i64> {
            if row.len() != self.in_dim {
                return Err(PipelineError::SchemaMismatch(format!(
                    "feature length mismatch: got {}, expected {}",
                    row.len(),
                    self.in_dim
                )));
            }
            let x: Vec<f32> = row.iter().map(|v| *v as f32).collect();
            let input = Tensor::from_slice(&x)
                .f_reshape([1, self.in_dim as i64])
                .map_err(failure)?
                .to_device(self.device);
            let out = self.model.forward_ts(&[input]).map_err(failure)?;
            class_index(&out)
        }
    }

    fn failure(e: tch::TchError) -> PipelineError {
        PipelineError::Failure(e.to_string())
    }

    /// Argmax over the class dimension of a `[1, C]` score tensor.
    fn class_index(scores: &Tensor) -> PipelineResult<i64> {
        scores
            .f_argmax(1, false)
            .and_then(|idx| idx.f_int64_value(&[0]))
            .map_err(failure)
    }

}

/// Picks the loader from the file extension: `.json` tree ensembles, `.pt` TorchScript.
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "json" => {
            let bytes = std::fs::read(path).map_err(|source| ArtifactLoadError::Read {
                artifact: ARTIFACT,
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(Forest::from_slice(&bytes)?))
        }
        #[cfg(feature = "torch")]
        "pt" => Ok(Box::new(TorchClassifier::load(path, FEATURE_COLUMNS.len())?)),
        other => Err(ArtifactLoadError::UnsupportedFormat(format!(
            "`.{other}` ({})",
            path.display()
        ))),
    }
}
