use std::{error::Error, fmt};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde_json::json;

use crate::{features::FieldError, forest::ForestError};

/// Request failures, each mapped to a status code and a `{"detail": ...}` body.
#[derive(Debug)]
pub enum ServiceError {
    /// The body couldn't be read as a `LoanApplication`.
    Rejected { status: StatusCode, detail: String },
    InvalidField(FieldError),
    Prediction(ForestError),
    NotFound,
    MethodNotAllowed,
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::InvalidField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { detail, .. } => write!(f, "{detail}"),
            Self::InvalidField(e) => write!(f, "{e}"),
            Self::Prediction(e) => write!(f, "Model prediction error: {e}"),
            Self::NotFound => write!(f, "Not found"),
            Self::MethodNotAllowed => write!(f, "Method Not Allowed"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidField(e) => Some(e),
            Self::Prediction(e) => Some(e),
            _ => None,
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(value: JsonRejection) -> Self {
        Self::Rejected {
            status: value.status(),
            detail: value.body_text(),
        }
    }
}

impl From<FieldError> for ServiceError {
    fn from(value: FieldError) -> Self {
        Self::InvalidField(value)
    }
}

impl From<ForestError> for ServiceError {
    fn from(value: ForestError) -> Self {
        Self::Prediction(value)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        } else if status != StatusCode::NOT_FOUND {
            warn!("rejected request ({status}): {self}");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
