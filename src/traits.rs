use ndarray::prelude::*;

use crate::axis::Axis;
use crate::errors::Result;
use crate::image_processor::CanonicalImage;

/// Spatial input size of a model, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub height: u32,
    pub width: u32,
}

impl Resolution {
    pub const fn square(size: u32) -> Self {
        Self {
            height: size,
            width: size,
        }
    }

    /// `[height, width]`, the order used in responses.
    pub const fn as_array(self) -> [u32; 2] {
        [self.height, self.width]
    }
}

/// Produces a model-ready tensor from a canonical image.
///
/// The adapter owns the layout convention (channel order, value range, batch axis) of
/// its model family. Nothing downstream of `adapt` inspects the layout.
pub trait TensorAdapter: Send + Sync {
    /// Axis whose model consumes the tensor, reported in `Preprocess` errors.
    fn axis(&self) -> Axis;

    fn resolution(&self) -> Resolution;

    fn adapt(&self, image: &CanonicalImage) -> Result<Array4<f32>>;
}

/// An opaque classifier mapping a tensor to one raw score per class.
pub trait Scorer: Send + Sync {
    /// Input size declared by the loaded model, if it declares a fixed one.
    ///
    /// Queried once when the scorer is installed, never per request.
    fn declared_resolution(&self) -> Option<Resolution>;

    /// Raw scores, either logits or probabilities depending on the model.
    fn score(&self, tensor: ArrayView4<f32>) -> Result<Vec<f32>>;

    /// Short human readable description used in logs and health output.
    fn describe(&self) -> String;
}
