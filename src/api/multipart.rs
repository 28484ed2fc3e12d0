use axum::extract::multipart::{Field, Multipart};
use tracing::debug;

use super::errors::ApiError;
use crate::image_processor::RawUpload;

/// Parts of a multipart form that the prediction endpoints understand.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<RawUpload>,
    pub prediction_type: Option<String>,
}

impl UploadForm {
    /// Reads every part. Files are accepted under `file` and `files`; other text fields are ignored.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" | "files" => form.files.push(read_upload(field).await?),
                "prediction_type" => {
                    let value = field.text().await.map_err(|e| {
                        ApiError::InvalidRequest(format!("unreadable prediction_type: {e}"))
                    })?;
                    form.prediction_type = Some(value);
                }
                other => debug!(field = other, "ignoring multipart field"),
            }
        }

        Ok(form)
    }

    /// The single upload of a one-image endpoint.
    pub fn into_single(self) -> Result<RawUpload, ApiError> {
        self.files
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InvalidRequest("multipart field `file` is required".to_string()))
    }
}

async fn read_upload(field: Field<'_>) -> Result<RawUpload, ApiError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("failed to read {filename}: {e}")))?;

    debug!(%filename, ?content_type, size = bytes.len(), "received upload");
    Ok(RawUpload {
        filename,
        content_type,
        bytes: bytes.to_vec(),
    })
}
