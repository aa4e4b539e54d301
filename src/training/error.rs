use std::{error::Error, fmt};

use super::ModelError;
use crate::{dataset::DataError, forest::ForestError};

/// Any failure of a training run.
#[derive(Debug)]
pub enum TrainError {
    InvalidConfig(String),
    Data(DataError),
    Forest(ForestError),
    Model(ModelError),
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Data(e) => write!(f, "dataset error: {e}"),
            Self::Forest(e) => write!(f, "training error: {e}"),
            Self::Model(e) => write!(f, "could not save model: {e}"),
        }
    }
}

impl Error for TrainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConfig(_) => None,
            Self::Data(e) => Some(e),
            Self::Forest(e) => Some(e),
            Self::Model(e) => Some(e),
        }
    }
}

impl From<DataError> for TrainError {
    fn from(value: DataError) -> Self {
        Self::Data(value)
    }
}

impl From<ForestError> for TrainError {
    fn from(value: ForestError) -> Self {
        Self::Forest(value)
    }
}

impl From<ModelError> for TrainError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}
