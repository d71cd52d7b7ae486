//! Real-time traffic congestion prediction.
//!
//! A request is assembled into the training-time feature order, categoricals are
//! encoded against fixed vocabularies (unseen values become `-1`), numerics are
//! standard-scaled in fitted order, and a tree-ensemble classifier picks a class
//! that is resolved to a display label.

pub mod artifacts;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod scaler;
pub mod server;
pub mod types;

pub use artifacts::{ArtifactPaths, ArtifactStore};
pub use error::{ArtifactLoadError, PipelineError};
pub use pipeline::{Pipeline, Prediction};
pub use types::{PredictResponse, Status, TrafficInput};
