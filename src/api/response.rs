use serde::Serialize;

use crate::axis::{Axis, AxisSelection};
use crate::prediction::{BatchItemResult, CombinedResult, PredictionResult};

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub disaster_model_loaded: bool,
    pub damage_model_loaded: bool,
    pub disaster_classes: &'static [&'static str],
    pub damage_classes: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub disaster_model_loaded: bool,
    pub damage_model_loaded: bool,
    /// `[height, width]`, `null` until the model is loaded
    pub disaster_model_input_size: Option<[u32; 2]>,
    pub damage_model_input_size: Option<[u32; 2]>,
    pub supported_disaster_classes: &'static [&'static str],
    pub supported_damage_classes: &'static [&'static str],
    pub device: String,
    /// Same value as `device`, under the key older clients read.
    pub damage_device: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassList {
    pub classes: &'static [&'static str],
    pub count: usize,
}

impl ClassList {
    pub fn for_axis(axis: Axis) -> Self {
        let classes = axis.labels();
        Self {
            classes,
            count: classes.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassesResponse {
    pub disaster: ClassList,
    pub damage: ClassList,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadModelResponse {
    pub message: String,
    pub axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_input_size: Option<[u32; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SingleAxisResponse {
    pub success: bool,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub prediction: PredictionResult,
}

impl SingleAxisResponse {
    pub fn new(axis: Axis, filename: String, prediction: PredictionResult) -> Self {
        Self {
            success: true,
            filename,
            kind: axis.response_type(),
            prediction,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedResponse {
    pub success: bool,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub results: CombinedResult,
}

impl CombinedResponse {
    pub fn new(filename: String, results: CombinedResult) -> Self {
        Self {
            success: true,
            filename,
            kind: "combined_analysis",
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub prediction_type: AxisSelection,
    pub results: Vec<BatchItemResult>,
}
