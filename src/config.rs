//! Training and serving configuration.
//!
//! Defaults live here; the binary overlays environment variables and flags on top.

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use crate::forest::ForestParams;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "loan_model.json";
pub const DEFAULT_DATA_PATH: &str = "data/loan_default_dataset.csv";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Everything a training run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    /// Fraction of each class held out for evaluation.
    pub test_size: f64,
    /// Forest hyperparameters; `forest.seed` also seeds the train/test split.
    pub forest: ForestParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            test_size: DEFAULT_TEST_SIZE,
            forest: ForestParams::default(),
        }
    }
}

impl TrainConfig {
    /// Checks ranges that would otherwise fail deep inside training.
    ///
    /// # Returns
    /// A description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(format!("test_size must be in (0, 1), got {}", self.test_size));
        }
        if self.forest.n_estimators == 0 {
            return Err("n_estimators must be at least 1".to_string());
        }
        if self.forest.max_depth == 0 {
            return Err("max_depth must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Inference service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    pub host: IpAddr,
    pub port: u16,
    pub model_path: PathBuf,
    /// Origins allowed by CORS; `*` allows any.
    pub allow_origins: Vec<String>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            allow_origins: vec!["*".to_string()],
        }
    }
}

impl ServeConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether every origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.is_empty() || self.allow_origins.iter().any(|o| o == "*")
    }
}

/// Splits a comma separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_training_run() {
        let config = TrainConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.forest.n_estimators, 60);
        assert_eq!(config.forest.max_depth, 8);
        assert_eq!(config.forest.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = TrainConfig {
            test_size: 1.0,
            ..TrainConfig::default()
        };
        assert!(config.validate().is_err());

        config.test_size = 0.25;
        config.forest.max_depth = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            "max_depth must be at least 1"
        );
    }

    #[test]
    fn serve_address_and_origins() {
        let config = ServeConfig {
            port: 9000,
            allow_origins: parse_origins("http://a.test, ,http://b.test"),
            ..ServeConfig::default()
        };
        assert_eq!(config.addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.allow_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.allows_any_origin());
        assert!(ServeConfig::default().allows_any_origin());
    }
}
