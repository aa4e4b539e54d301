//! Loan approval prediction.
//!
//! Raw applicant fields are encoded by [`features`], historical records are
//! prepared by [`dataset`], a [`forest`] is fitted and persisted by
//! [`training`], and [`service`] serves it over HTTP.

pub mod config;
pub mod dataset;
pub mod features;
pub mod forest;
pub mod service;
pub mod training;

pub use features::{FeatureVector, FieldError, LoanApplication, LoanStatus};
pub use training::{ModelArtifact, Prediction, TrainReport, Trainer};
