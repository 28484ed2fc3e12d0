use std::path::PathBuf;
use thiserror::Error;

use crate::axis::Axis;

/// Structured error types for the classification pipeline.
///
/// Per-item and per-axis variants (`Decode`, `Preprocess`, `ModelNotLoaded`,
/// `Inference`) are caught by the composer and turned into failure entries.
/// The remaining variants reject a request before any model work starts.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Error processing image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported content type `{content_type}`: file must be an image (jpg, jpeg, png)")]
    UnsupportedContentType { content_type: String },

    #[error("Preprocessing failed for the {axis} model: {reason}")]
    Preprocess { axis: Axis, reason: String },

    #[error("The {axis} model is not loaded")]
    ModelNotLoaded { axis: Axis },

    #[error("Failed to load the {axis} model from {path:?}: {operation}: {source}")]
    ModelLoad {
        axis: Axis,
        path: PathBuf,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Prediction failed: {operation}")]
    Inference {
        operation: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Maximum {max} files allowed per batch, got {count}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Invalid prediction type `{value}`: expected one of disaster, damage, both")]
    InvalidAxisSelection { value: String },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

impl ClassifierError {
    pub(crate) fn inference(operation: impl Into<String>) -> Self {
        Self::Inference {
            operation: operation.into(),
            source: None,
        }
    }
}

impl From<image::ImageError> for ClassifierError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode { source: err }
    }
}

/// Runtime failures while a session is already loaded.
///
/// Load-time failures are wrapped into `ModelLoad` by the loader itself.
impl From<ort::Error> for ClassifierError {
    fn from(err: ort::Error) -> Self {
        Self::Inference {
            operation: format!("onnx runtime: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ndarray::ShapeError> for ClassifierError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Inference {
            operation: format!("tensor shape conversion: {err}"),
            source: Some(Box::new(err)),
        }
    }
}
