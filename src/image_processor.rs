use image::RgbImage;
use tracing::debug;

use crate::errors::{ClassifierError, Result};

/// Decoded RGB pixel grid shared by every tensor adapter.
pub type CanonicalImage = RgbImage;

/// One uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RawUpload {
    pub fn new(filename: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_image_content_type)
    }

    /// Rejects uploads whose declared MIME type is not `image/*`.
    pub fn ensure_image(&self) -> Result<()> {
        if self.is_image() {
            Ok(())
        } else {
            Err(ClassifierError::UnsupportedContentType {
                content_type: self
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "none".to_string()),
            })
        }
    }
}

pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Decodes arbitrary bytes into a canonical 8-bit RGB image.
///
/// The container format is sniffed from the bytes, not from the declared content type.
/// Grayscale, palette and alpha sources are converted to RGB and alpha is dropped.
pub fn decode_image(bytes: &[u8]) -> Result<CanonicalImage> {
    let image = image::load_from_memory(bytes).map_err(|source| ClassifierError::Decode { source })?;
    debug!(
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded upload"
    );
    Ok(image.into_rgb8())
}
