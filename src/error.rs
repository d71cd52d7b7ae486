use std::path::PathBuf;

/// Failure to bring one of the model artifacts into memory. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("failed to read {artifact} at {}", path.display())]
    Read {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {artifact}")]
    Decode {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {artifact}: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },

    #[error("unsupported classifier format: {0}")]
    UnsupportedFormat(String),

    #[cfg(feature = "torch")]
    #[error("failed to load TorchScript {}", path.display())]
    Torch {
        path: PathBuf,
        #[source]
        source: tch::TchError,
    },
}

impl ArtifactLoadError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}

/// Per-request failure. Reported in the response body, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("{0}")]
    Failure(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
