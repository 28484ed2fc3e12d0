use std::sync::Arc;

use tracing::{debug, warn};

use crate::axis::{Axis, AxisSelection};
use crate::errors::Result;
use crate::image_processor::{decode_image, CanonicalImage, RawUpload};
use crate::prediction::{AxisOutcome, CombinedResult, PredictionResult};
use crate::registry::ScorerRegistry;

/// Runs uploads through decode, adaptation, scoring and normalization.
#[derive(Clone)]
pub struct Classifier {
    registry: Arc<ScorerRegistry>,
}

impl Classifier {
    pub const fn new(registry: Arc<ScorerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ScorerRegistry {
        &self.registry
    }

    /// Scores one decoded image on one axis.
    pub fn predict(&self, axis: Axis, image: &CanonicalImage) -> Result<PredictionResult> {
        let entry = self.registry.get(axis)?;
        let tensor = entry.adapter.adapt(image)?;
        let scores = entry.scorer.score(tensor.view())?;
        debug!(%axis, ?scores, "raw scores");

        let prediction = PredictionResult::from_scores(axis, &scores)?;
        debug!(
            %axis,
            class = %prediction.predicted_class,
            confidence = prediction.confidence,
            "prediction"
        );
        Ok(prediction)
    }

    /// Single-axis request: every failure is surfaced to the caller.
    pub fn predict_upload(&self, axis: Axis, upload: &RawUpload) -> Result<PredictionResult> {
        upload.ensure_image()?;
        let image = decode_image(&upload.bytes)?;
        self.predict(axis, &image)
    }

    /// Evaluates each selected axis independently; one axis failing never hides the other.
    pub fn evaluate(&self, selection: AxisSelection, image: &CanonicalImage) -> Vec<(Axis, AxisOutcome)> {
        selection
            .axes()
            .iter()
            .map(|&axis| (axis, self.outcome(axis, image)))
            .collect()
    }

    /// Both axes on one upload. Only content type and decode failures reject the request.
    pub fn predict_combined(&self, upload: &RawUpload) -> Result<CombinedResult> {
        upload.ensure_image()?;
        let image = decode_image(&upload.bytes)?;

        Ok(CombinedResult {
            disaster_detection: self.outcome(Axis::Disaster, &image),
            damage_assessment: self.outcome(Axis::Damage, &image),
        })
    }

    fn outcome(&self, axis: Axis, image: &CanonicalImage) -> AxisOutcome {
        let result = self.predict(axis, image);
        if let Err(e) = &result {
            warn!(%axis, error = %e, "axis prediction failed");
        }
        AxisOutcome::from(result)
    }
}
