use std::{
    error::Error,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::Evaluation;
use crate::{
    features::{FeatureVector, LoanStatus, FEATURE_NAMES, N_FEATURES},
    forest::{ForestError, RandomForest},
};

/// Bumped whenever the persisted layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// Failures while persisting or loading a model.
#[derive(Debug)]
pub enum ModelError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    UnsupportedVersion { got: u32, expected: u32 },
    /// The model was trained on a different feature layout than this build encodes.
    SchemaMismatch { got: Vec<String> },
    /// The forest's shape doesn't fit the encoder, or its trees are malformed.
    InvalidForest(ForestError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json(e) => write!(f, "malformed model file: {e}"),
            Self::UnsupportedVersion { got, expected } => {
                write!(f, "unsupported model format version {got}, expected {expected}")
            }
            Self::SchemaMismatch { got } => write!(
                f,
                "model features {got:?} don't match the encoder's {FEATURE_NAMES:?}"
            ),
            Self::InvalidForest(e) => write!(f, "invalid model: {e}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            Self::InvalidForest(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Outcome of a single prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub status: LoanStatus,
    /// Probability per class, indexed by class.
    pub probabilities: Vec<f64>,
}

impl Prediction {
    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .get(self.status.class())
            .copied()
            .unwrap_or_default()
    }
}

/// A trained forest together with what's needed to serve it safely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    format_version: u32,
    feature_names: Vec<String>,
    forest: RandomForest,
    evaluation: Evaluation,
    train_samples: usize,
    test_samples: usize,
}

impl ModelArtifact {
    pub fn new(
        forest: RandomForest,
        evaluation: Evaluation,
        train_samples: usize,
        test_samples: usize,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            forest,
            evaluation,
            train_samples,
            test_samples,
        }
    }

    /// Writes the artifact as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let io_err = |source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_vec(self)?;
        fs::write(path, json).map_err(io_err)
    }

    /// Reads an artifact and checks it matches this build's feature layout and
    /// that every tree can be evaluated.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact: Self = serde_json::from_slice(&bytes)?;
        artifact.check()?;
        Ok(artifact)
    }

    fn check(&self) -> Result<(), ModelError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                got: self.format_version,
                expected: FORMAT_VERSION,
            });
        }

        if !self.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES) {
            return Err(ModelError::SchemaMismatch {
                got: self.feature_names.clone(),
            });
        }

        let forest = &self.forest;
        if forest.n_features() != N_FEATURES {
            return Err(ModelError::InvalidForest(ForestError::ShapeMismatch {
                what: "model features",
                got: forest.n_features(),
                expected: N_FEATURES,
            }));
        }
        // classes map onto LoanStatus
        if forest.n_classes() != 2 {
            return Err(ModelError::InvalidForest(ForestError::ShapeMismatch {
                what: "model classes",
                got: forest.n_classes(),
                expected: 2,
            }));
        }
        forest.validate().map_err(ModelError::InvalidForest)
    }

    /// Runs the forest on an encoded application.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ForestError> {
        let (class, probabilities) = self.forest.classify(features.as_slice())?;

        Ok(Prediction {
            status: LoanStatus::from_class(class),
            probabilities,
        })
    }

    /// The `n` most important features by mean impurity decrease, highest first.
    pub fn top_features(&self, n: usize) -> Vec<(&'static str, f64)> {
        let mut ranked: Vec<_> = FEATURE_NAMES
            .iter()
            .copied()
            .zip(self.forest.feature_importances())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn train_samples(&self) -> usize {
        self.train_samples
    }

    pub fn test_samples(&self) -> usize {
        self.test_samples
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2};

    use serde_json::{json, Value};

    use super::*;
    use crate::forest::ForestParams;

    fn artifact() -> ModelArtifact {
        // approve whenever credit history is 1
        let x = Array2::from_shape_fn((40, N_FEATURES), |(r, c)| match c {
            9 => (r % 2) as f64,
            _ => 1.0,
        });
        let y = Array1::from_iter((0..40).map(|r| r % 2));
        let params = ForestParams {
            n_estimators: 5,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(params, &x, &y).unwrap();
        let eval = Evaluation::new(&y, &forest.predict_batch(&x).unwrap()).unwrap();
        ModelArtifact::new(forest, eval, 40, 0)
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("loan-default-artifact-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn save_then_load_preserves_predictions() {
        let artifact = artifact();
        let path = temp_path("nested/model.json");
        artifact.save(&path).unwrap();

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded, artifact);

        let mut values = [1.0; N_FEATURES];
        values[9] = 1.0;
        let prediction = loaded.predict(&FeatureVector::new(values)).unwrap();
        assert_eq!(prediction.status, LoanStatus::Approved);
        assert!(prediction.confidence() > 0.5);
    }

    #[test]
    fn rejects_foreign_feature_layout() {
        let mut artifact = artifact();
        artifact.feature_names.swap(0, 1);
        let path = temp_path("swapped.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch { .. }));
    }

    #[test]
    fn rejects_other_format_versions() {
        let mut artifact = artifact();
        artifact.format_version = FORMAT_VERSION + 1;
        assert!(matches!(
            artifact.check(),
            Err(ModelError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn credit_history_is_the_top_feature() {
        let top = artifact().top_features(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0], ("Credit_History", 1.0));
        assert!(top[1..].iter().all(|&(_, imp)| imp == 0.0));
    }

    fn tampered(edit: impl FnOnce(&mut Value)) -> Result<(), ModelError> {
        let mut value = serde_json::to_value(artifact()).unwrap();
        edit(&mut value);
        let artifact: ModelArtifact = serde_json::from_value(value).unwrap();
        artifact.check()
    }

    #[test]
    fn rejects_split_on_unknown_feature_when_loading() {
        let mut value = serde_json::to_value(artifact()).unwrap();
        // every tree splits on the credit history column first
        value["forest"]["trees"][0]["root"]["Split"]["feature"] = json!(40);
        let path = temp_path("feature-40.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(
            matches!(&err, ModelError::InvalidForest(ForestError::Corrupt(msg)) if msg.contains("feature 40")),
            "{err}"
        );
    }

    #[test]
    fn rejects_malformed_forests() {
        let no_trees = tampered(|v| v["forest"]["trees"] = json!([]));
        assert!(matches!(no_trees, Err(ModelError::InvalidForest(ForestError::Corrupt(_)))));

        let narrow = tampered(|v| v["forest"]["n_features"] = json!(3));
        assert!(matches!(
            narrow,
            Err(ModelError::InvalidForest(ForestError::ShapeMismatch { got: 3, .. }))
        ));

        let three_classes = tampered(|v| v["forest"]["n_classes"] = json!(3));
        assert!(matches!(three_classes, Err(ModelError::InvalidForest(_))));

        let short_leaf = tampered(|v| {
            v["forest"]["trees"][0]["root"]["Split"]["left"]["Leaf"]["proba"] = json!([1.0]);
        });
        assert!(matches!(short_leaf, Err(ModelError::InvalidForest(ForestError::Corrupt(_)))));
    }

    #[test]
    fn missing_and_malformed_files() {
        assert!(matches!(
            ModelArtifact::load(&temp_path("absent.json")),
            Err(ModelError::Io { .. })
        ));

        let path = temp_path("garbage.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(ModelArtifact::load(&path), Err(ModelError::Json(_))));
    }
}
