use std::{error::Error, fmt};

/// The forest module's result type.
pub type Result<T> = std::result::Result<T, ForestError>;

/// Errors produced while fitting or querying a forest.
#[derive(Debug, Clone, PartialEq)]
pub enum ForestError {
    /// Fitting was attempted without any samples.
    EmptyDataset,
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidParam(String),
    /// A deserialized forest that can't be evaluated safely.
    Corrupt(String),
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDataset => write!(f, "cannot fit a forest on an empty dataset"),
            Self::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
            Self::InvalidParam(msg) => write!(f, "invalid parameter: {msg}"),
            Self::Corrupt(msg) => write!(f, "corrupt forest: {msg}"),
        }
    }
}

impl Error for ForestError {}
