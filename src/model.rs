use std::path::{Path, PathBuf};

use ndarray::prelude::*;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{
    axis::Axis,
    errors::{ClassifierError, Result},
    preprocess::{DAMAGE_RESOLUTION, DEFAULT_DISASTER_RESOLUTION},
    traits::{Resolution, Scorer},
};

/// An ONNX Runtime session plus the bits of its signature we care about.
struct OnnxSession {
    path: PathBuf,
    input_shape: Option<Vec<i64>>,
    session: Mutex<Session>,
}

impl OnnxSession {
    fn open(axis: Axis, model_path: &Path, device_id: i32) -> Result<Self> {
        let load_error = |operation: &str, source: ort::Error| ClassifierError::ModelLoad {
            axis,
            path: model_path.to_path_buf(),
            operation: operation.to_string(),
            source: Box::new(source),
        };

        let file_error = |source: std::io::Error| ClassifierError::ModelLoad {
            axis,
            path: model_path.to_path_buf(),
            operation: "model file lookup".to_string(),
            source: Box::new(source),
        };
        let metadata = std::fs::metadata(model_path).map_err(file_error)?;
        if !metadata.is_file() {
            return Err(file_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "model path is not a regular file",
            )));
        }

        let session = SessionBuilder::new()
            .map_err(|e| load_error("session builder initialization", e))?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| load_error("execution provider registration", e))?
            .with_memory_pattern(true)
            .map_err(|e| load_error("memory pattern configuration", e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error("model file parsing", e))?;

        let input = session.inputs.first().ok_or_else(|| ClassifierError::ModelLoad {
            axis,
            path: model_path.to_path_buf(),
            operation: "input signature lookup".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "model declares no inputs",
            )),
        })?;
        let input_shape = input.input_type.tensor_shape().map(|shape| shape.to_vec());
        debug!(%axis, input = %input.name, shape = ?input_shape, "opened onnx session");

        Ok(Self {
            path: model_path.to_path_buf(),
            input_shape,
            session: Mutex::new(session),
        })
    }

    /// Runs a zero tensor through the graph so incompatible checkpoints fail at load time.
    fn warm_up(&self, axis: Axis, shape: [usize; 4]) -> Result<()> {
        let zeros = Array4::<f32>::zeros(shape);
        self.run(zeros.view()).map(|_| ()).map_err(|e| ClassifierError::ModelLoad {
            axis,
            path: self.path.clone(),
            operation: format!("warm-up inference with input shape {shape:?}"),
            source: Box::new(e),
        })
    }

    fn run(&self, tensor: ArrayView4<f32>) -> Result<Vec<f32>> {
        let mut session = self.session.lock();
        let outputs =
            session.run(ort::inputs![TensorRef::from_array_view(&tensor.as_standard_layout())?])?;
        let scores = outputs[0]
            .try_extract_array::<f32>()?
            .iter()
            .copied()
            .collect();
        Ok(scores)
    }
}

/// Disaster-type classifier exported from a channel-last network (`[1, H, W, 3]`).
pub struct DisasterModel {
    session: OnnxSession,
    resolution: Option<Resolution>,
}

impl DisasterModel {
    pub fn new(model_path: &Path, device_id: i32) -> Result<Self> {
        let session = OnnxSession::open(Axis::Disaster, model_path, device_id)?;
        let resolution = session.input_shape.as_deref().and_then(channels_last_resolution);

        let effective = resolution.unwrap_or(DEFAULT_DISASTER_RESOLUTION);
        session.warm_up(
            Axis::Disaster,
            [1, effective.height as usize, effective.width as usize, 3],
        )?;

        info!(
            path = %model_path.display(),
            declared = ?session.input_shape,
            height = effective.height,
            width = effective.width,
            "disaster model loaded"
        );
        Ok(Self {
            session,
            resolution,
        })
    }
}

impl Scorer for DisasterModel {
    fn declared_resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    fn score(&self, tensor: ArrayView4<f32>) -> Result<Vec<f32>> {
        self.session.run(tensor)
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.session.path.display())
    }
}

/// Damage-severity classifier exported from a channel-first network (`[1, 3, 64, 64]`).
pub struct DamageModel {
    session: OnnxSession,
}

impl DamageModel {
    pub fn new(model_path: &Path, device_id: i32) -> Result<Self> {
        let session = OnnxSession::open(Axis::Damage, model_path, device_id)?;
        session.warm_up(
            Axis::Damage,
            [
                1,
                3,
                DAMAGE_RESOLUTION.height as usize,
                DAMAGE_RESOLUTION.width as usize,
            ],
        )?;

        info!(path = %model_path.display(), "damage model loaded");
        Ok(Self { session })
    }
}

impl Scorer for DamageModel {
    fn declared_resolution(&self) -> Option<Resolution> {
        None
    }

    fn score(&self, tensor: ArrayView4<f32>) -> Result<Vec<f32>> {
        self.session.run(tensor)
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.session.path.display())
    }
}

/// Opens the ONNX scorer for `axis`.
pub fn load_scorer(axis: Axis, model_path: &Path, device_id: i32) -> Result<Box<dyn Scorer>> {
    Ok(match axis {
        Axis::Disaster => Box::new(DisasterModel::new(model_path, device_id)?),
        Axis::Damage => Box::new(DamageModel::new(model_path, device_id)?),
    })
}

/// `(H, W)` of a `[N, H, W, C]` input shape when both are fixed.
///
/// Dynamic dimensions are reported by the runtime as non-positive values.
fn channels_last_resolution(shape: &[i64]) -> Option<Resolution> {
    match shape {
        [_, height, width, _] if *height > 0 && *width > 0 => Some(Resolution {
            height: u32::try_from(*height).ok()?,
            width: u32::try_from(*width).ok()?,
        }),
        _ => None,
    }
}
