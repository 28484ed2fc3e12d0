use rayon::prelude::*;
use tracing::{info, warn};

use crate::axis::AxisSelection;
use crate::classifier::Classifier;
use crate::errors::{ClassifierError, Result};
use crate::image_processor::{decode_image, RawUpload};
use crate::prediction::BatchItemResult;

/// Hard cap on uploads per batch request.
pub const MAX_BATCH_SIZE: usize = 10;

/// A validated batch: non-empty, within the cap, with a known axis selection.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    uploads: Vec<RawUpload>,
    selection: AxisSelection,
}

impl BatchRequest {
    pub fn new(uploads: Vec<RawUpload>, selection: AxisSelection) -> Result<Self> {
        if uploads.is_empty() {
            return Err(ClassifierError::Validation {
                field: "files".to_string(),
                reason: "must contain at least one file".to_string(),
            });
        }
        if uploads.len() > MAX_BATCH_SIZE {
            return Err(ClassifierError::BatchTooLarge {
                count: uploads.len(),
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(Self { uploads, selection })
    }

    /// Parses the selection mode first, so an invalid mode wins over any size problem.
    pub fn parse(uploads: Vec<RawUpload>, mode: &str) -> Result<Self> {
        let selection = mode.parse::<AxisSelection>()?;
        Self::new(uploads, selection)
    }

    pub const fn selection(&self) -> AxisSelection {
        self.selection
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }
}

impl Classifier {
    /// Runs every item independently; the result order matches the upload order.
    ///
    /// A bad item produces a failed entry and never aborts its siblings.
    pub fn classify_batch(&self, request: &BatchRequest) -> Vec<BatchItemResult> {
        let selection = request.selection;
        let results: Vec<BatchItemResult> = request
            .uploads
            .par_iter()
            .map(|upload| self.classify_item(upload, selection))
            .collect();

        let succeeded = results.iter().filter(|r| r.success()).count();
        info!(
            items = results.len(),
            succeeded,
            selection = %selection,
            "batch complete"
        );
        results
    }

    fn classify_item(&self, upload: &RawUpload, selection: AxisSelection) -> BatchItemResult {
        if !upload.is_image() {
            warn!(filename = %upload.filename, content_type = ?upload.content_type, "skipping non-image upload");
            return BatchItemResult::rejected(&upload.filename, selection, "File must be an image");
        }

        match decode_image(&upload.bytes) {
            Ok(image) => {
                BatchItemResult::evaluated(&upload.filename, selection, self.evaluate(selection, &image))
            }
            Err(e) => {
                warn!(filename = %upload.filename, error = %e, "batch item failed to decode");
                BatchItemResult::rejected(&upload.filename, selection, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploads(count: usize) -> Vec<RawUpload> {
        (0..count)
            .map(|i| RawUpload::new(format!("{i}.png"), Some("image/png"), Vec::new()))
            .collect()
    }

    #[test]
    fn test_batch_cap() {
        assert!(BatchRequest::new(uploads(MAX_BATCH_SIZE), AxisSelection::Both).is_ok());

        let result = BatchRequest::new(uploads(MAX_BATCH_SIZE + 1), AxisSelection::Both);
        assert!(matches!(
            result,
            Err(ClassifierError::BatchTooLarge { count: 11, max: 10 })
        ));
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert!(matches!(
            BatchRequest::new(Vec::new(), AxisSelection::Damage),
            Err(ClassifierError::Validation { .. })
        ));
    }

    #[test]
    fn test_invalid_mode_is_checked_first() {
        let result = BatchRequest::parse(uploads(20), "everything");
        assert!(matches!(result, Err(ClassifierError::InvalidAxisSelection { .. })));

        let request = BatchRequest::parse(uploads(2), "damage").unwrap();
        assert_eq!(request.selection(), AxisSelection::Damage);
        assert_eq!(request.len(), 2);
    }
}
