use std::path::PathBuf;

use log::info;

use super::{Evaluation, ModelArtifact, TrainError};
use crate::{
    config::TrainConfig,
    dataset::{self, Dataset, MedianImputer},
    features::Feature,
    forest::RandomForest,
};

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub evaluation: Evaluation,
    pub train_samples: usize,
    pub test_samples: usize,
    pub model_path: PathBuf,
}

/// Loads historical records, fits the forest, evaluates it and persists it.
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    /// Returns a new `Trainer`.
    ///
    /// # Errors
    /// `TrainError::InvalidConfig` if the configuration is out of range.
    pub fn new(config: TrainConfig) -> Result<Self, TrainError> {
        config.validate().map_err(TrainError::InvalidConfig)?;
        Ok(Self { config })
    }

    /// Runs the whole pipeline: load, impute, split, fit, evaluate, save.
    ///
    /// # Returns
    /// The held-out evaluation and where the model was written.
    pub fn run(&self) -> Result<TrainReport, TrainError> {
        let data_path = &self.config.data_path;
        info!("loading records from {}", data_path.display());

        let table = dataset::load_csv(data_path)?;
        let imputer = MedianImputer::fit(&table)?;
        for feature in Feature::ALL {
            let missing = table.column(feature).iter().filter(|v| v.is_none()).count();
            if missing > 0 {
                info!(
                    "imputing {missing} missing {} value(s) with median {}",
                    feature.column(),
                    imputer.median(feature)
                );
            }
        }

        let artifact = self.fit(&imputer.transform(table)?)?;

        let model_path = &self.config.model_path;
        artifact.save(model_path)?;
        info!("model saved as {}", model_path.display());

        Ok(TrainReport {
            evaluation: *artifact.evaluation(),
            train_samples: artifact.train_samples(),
            test_samples: artifact.test_samples(),
            model_path: model_path.clone(),
        })
    }

    /// Splits an imputed dataset, fits on the train part and evaluates on the rest.
    pub fn fit(&self, dataset: &Dataset) -> Result<ModelArtifact, TrainError> {
        let params = self.config.forest;
        let (train, test) = dataset::train_test_split(dataset, self.config.test_size, params.seed)?;
        info!(
            "training {} trees (max depth {}) on {} samples, holding out {}",
            params.n_estimators,
            params.max_depth,
            train.len(),
            test.len()
        );

        let forest = RandomForest::fit(params, train.x(), train.y())?;
        let predicted = forest.predict_batch(test.x())?;
        let evaluation = Evaluation::new(test.y(), &predicted)?;
        info!("Accuracy Score: {:.4}", evaluation.accuracy);

        let artifact = ModelArtifact::new(forest, evaluation, train.len(), test.len());
        let top = artifact
            .top_features(3)
            .iter()
            .map(|(name, importance)| format!("{name} {importance:.3}"))
            .collect::<Vec<_>>()
            .join(", ");
        info!("most important features: {top}");

        Ok(artifact)
    }
}
