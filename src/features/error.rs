use std::{error::Error, fmt};

/// A single raw field that could not be turned into a feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A categorical value outside the accepted set.
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
    /// A numeric column whose text is not a number.
    NotANumber { field: &'static str, value: String },
    /// A number that is negative, infinite or NaN.
    OutOfRange { field: &'static str, value: f64 },
}

impl FieldError {
    /// Returns the name of the offending column.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Invalid { field, .. }
            | Self::NotANumber { field, .. }
            | Self::OutOfRange { field, .. } => field,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { field, expected } => write!(f, "{field} must be {expected}"),
            Self::NotANumber { field, value } => {
                write!(f, "{field} must be a number, got '{value}'")
            }
            Self::OutOfRange { field, value } => {
                write!(f, "{field} must be a finite non-negative number, got {value}")
            }
        }
    }
}

impl Error for FieldError {}
