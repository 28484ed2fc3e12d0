use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::errors::ClassifierError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: String,
    pub message: String,
}

/// A request-level rejection, rendered as JSON with a matching status code.
#[derive(Debug)]
pub enum ApiError {
    Classifier(ClassifierError),
    InvalidRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Classifier(err) => match err {
                ClassifierError::Decode { .. }
                | ClassifierError::UnsupportedContentType { .. }
                | ClassifierError::BatchTooLarge { .. }
                | ClassifierError::InvalidAxisSelection { .. }
                | ClassifierError::Validation { .. } => StatusCode::BAD_REQUEST,
                ClassifierError::ModelNotLoaded { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ClassifierError::Preprocess { .. }
                | ClassifierError::ModelLoad { .. }
                | ClassifierError::Inference { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Classifier(err) => match err {
                ClassifierError::Decode { .. } => "decode_error",
                ClassifierError::UnsupportedContentType { .. } => "unsupported_content_type",
                ClassifierError::BatchTooLarge { .. } => "batch_too_large",
                ClassifierError::InvalidAxisSelection { .. } => "invalid_axis_selection",
                ClassifierError::Validation { .. } => "validation_error",
                ClassifierError::ModelNotLoaded { .. } => "model_not_loaded",
                ClassifierError::Preprocess { .. } => "preprocess_error",
                ClassifierError::ModelLoad { .. } => "model_load_error",
                ClassifierError::Inference { .. } => "inference_error",
            },
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ApiError::Classifier(err) => err.to_string(),
            ApiError::InvalidRequest(msg) | ApiError::Internal(msg) => msg.clone(),
        };
        ErrorResponse {
            success: false,
            error_type: self.error_type().to_string(),
            message,
        }
    }
}

impl From<ClassifierError> for ApiError {
    fn from(err: ClassifierError) -> Self {
        ApiError::Classifier(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();
        if status.is_server_error() {
            error!(error_type = %body.error_type, message = %body.message, "request failed");
        } else {
            warn!(error_type = %body.error_type, message = %body.message, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}
