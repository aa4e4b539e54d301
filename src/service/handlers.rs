use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use log::info;
use serde::{Deserialize, Serialize};

use super::{AppState, ServiceError};
use crate::features::{LoanApplication, FEATURE_NAMES};

/// Body of a successful `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// The application exactly as submitted.
    pub input: LoanApplication,
    /// Predicted class as a string, `"1"` approved or `"0"` rejected.
    pub prediction: String,
    pub label: String,
    /// Class probabilities, one row per application: `[[rejected, approved]]`.
    pub probability: Vec<Vec<f64>>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: ModelInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub accuracy: f64,
    pub train_samples: usize,
    pub test_samples: usize,
    pub features: Vec<String>,
}

/// Validates and encodes an application, then runs the model on it.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoanApplication>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ServiceError> {
    let Json(application) = payload?;
    let features = application.encode()?;
    let prediction = state.model().predict(&features)?;

    let confidence = prediction.confidence();
    info!(
        "predicted {} with confidence {confidence:.3}",
        prediction.status.label()
    );

    Ok(Json(PredictionResponse {
        input: application,
        prediction: prediction.status.class().to_string(),
        label: prediction.status.label().to_string(),
        probability: vec![prediction.probabilities],
        confidence,
    }))
}

/// Reports that the service is up along with what model it serves.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model = state.model();
    let params = model.forest().params();

    Json(HealthResponse {
        status: "ok".to_string(),
        model: ModelInfo {
            n_estimators: model.forest().n_trees(),
            max_depth: params.max_depth,
            accuracy: model.evaluation().accuracy,
            train_samples: model.train_samples(),
            test_samples: model.test_samples(),
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        },
    })
}

pub async fn not_found() -> ServiceError {
    ServiceError::NotFound
}

pub async fn method_not_allowed() -> ServiceError {
    ServiceError::MethodNotAllowed
}
