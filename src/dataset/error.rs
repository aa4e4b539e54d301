use std::{error::Error, fmt, io, path::PathBuf};

use polars::prelude::PolarsError;

use crate::features::FieldError;

/// The dataset module's result type.
pub type Result<T> = std::result::Result<T, DataError>;

/// Failures while reading and preparing historical records.
#[derive(Debug)]
pub enum DataError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Csv(PolarsError),
    MissingColumn(String),
    /// A non-empty cell that the encoder rejects. `row` is 1-based over data rows.
    InvalidCell {
        row: usize,
        source: FieldError,
    },
    InvalidLabel {
        row: usize,
        value: Option<String>,
    },
    /// Imputation needs at least one observed value per column.
    NoObservedValues(&'static str),
    Empty,
    InvalidSplit(String),
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::MissingColumn(name) => write!(f, "missing column '{name}'"),
            Self::InvalidCell { row, source } => write!(f, "row {row}: {source}"),
            Self::InvalidLabel { row, value: Some(value) } => write!(
                f,
                "row {row}: Loan_Status must be 'Y' or 'N', got '{value}'"
            ),
            Self::InvalidLabel { row, value: None } => {
                write!(f, "row {row}: Loan_Status is missing")
            }
            Self::NoObservedValues(column) => {
                write!(f, "column '{column}' has no values to impute from")
            }
            Self::Empty => write!(f, "the dataset has no rows"),
            Self::InvalidSplit(msg) => write!(f, "invalid split: {msg}"),
            Self::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(e) => Some(e),
            Self::InvalidCell { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PolarsError> for DataError {
    fn from(value: PolarsError) -> Self {
        Self::Csv(value)
    }
}
