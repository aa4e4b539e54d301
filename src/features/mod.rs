//! Raw applicant fields to numeric feature vectors.
//!
//! The same encoder runs over CSV cells while training and over request
//! bodies while serving.

mod application;
mod error;
mod schema;

pub use application::{FeatureVector, LoanApplication};
pub use error::FieldError;
pub use schema::{Feature, LoanStatus, FEATURE_NAMES, N_FEATURES};
