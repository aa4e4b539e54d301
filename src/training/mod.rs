//! Fitting, evaluating and persisting the classifier.

mod artifact;
mod error;
mod metrics;
mod trainer;

pub use artifact::{ModelArtifact, ModelError, Prediction, FORMAT_VERSION};
pub use error::TrainError;
pub use metrics::Evaluation;
pub use trainer::{TrainReport, Trainer};
