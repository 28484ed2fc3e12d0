pub mod api;
pub mod axis;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod image_processor;
pub mod model;
pub mod normalize;
pub mod prediction;
pub mod preprocess;
pub mod registry;
pub mod traits;

pub mod mocks;

pub use axis::{Axis, AxisSelection, DAMAGE_CLASSES, DISASTER_CLASSES};
pub use batch::{BatchRequest, MAX_BATCH_SIZE};
pub use classifier::Classifier;
pub use config::Config;
pub use errors::{ClassifierError, Result};
pub use image_processor::{decode_image, CanonicalImage, RawUpload};
pub use prediction::{AxisOutcome, BatchItemResult, CombinedResult, PredictionResult};
pub use registry::ScorerRegistry;
pub use traits::*;
