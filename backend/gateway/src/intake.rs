//! Intake of the uploaded image.
//!
//! A file part is a field named `image` that carries a non-empty filename.
//! The first one wins; anything after it is left unread.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;
use specscan_core::{PipelineError, Upload};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Multipart field clients send the image under.
pub const IMAGE_FIELD: &str = "image";

/// Pull the image part out of the request body.
pub async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> Result<Upload, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(%rejection, "Upload request is not multipart");
        PipelineError::MissingInput
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        debug!(filename = %filename, size_bytes = data.len(), "Image part received");
        return Ok(Upload::new(filename, content_type, data));
    }

    Err(PipelineError::MissingInput.into())
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "Upload exceeds body limit");
        ApiError::PayloadTooLarge
    } else {
        warn!(error = %err, "Unreadable multipart body");
        PipelineError::MissingInput.into()
    }
}
