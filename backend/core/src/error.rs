use thiserror::Error;

/// Caller-visible message for a request without an image part.
pub const MISSING_INPUT_MESSAGE: &str = "No image file provided.";

/// Caller-visible message for every server-side pipeline failure.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process image.";

/// Terminal failure of one ingestion request.
///
/// The `Display` output carries the internal detail and is meant for logs.
/// What crosses the HTTP boundary is [`PipelineError::public_message`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no image file part in request")]
    MissingInput,

    #[error("inference failed: {0}")]
    InferenceFailure(String),

    #[error("persistence failed: {0}")]
    PersistenceFailure(String),
}

impl PipelineError {
    /// Whether the caller is at fault (4xx) rather than a dependency (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::MissingInput)
    }

    /// Stable, category-level message safe to return to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            PipelineError::MissingInput => MISSING_INPUT_MESSAGE,
            PipelineError::InferenceFailure(_) | PipelineError::PersistenceFailure(_) => {
                PROCESSING_FAILED_MESSAGE
            }
        }
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MissingInput => "missing_input",
            PipelineError::InferenceFailure(_) => "inference_failure",
            PipelineError::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_messages_hide_detail() {
        let err = PipelineError::InferenceFailure("connection refused (10.0.0.4:8000)".into());
        assert_eq!(err.public_message(), "Failed to process image.");
        assert!(err.to_string().contains("connection refused"));

        let err = PipelineError::PersistenceFailure("disk I/O error".into());
        assert_eq!(err.public_message(), "Failed to process image.");
        assert!(!err.is_client_error());
    }

    #[test]
    fn missing_input_is_client_error() {
        let err = PipelineError::MissingInput;
        assert!(err.is_client_error());
        assert_eq!(err.public_message(), "No image file provided.");
        assert_eq!(err.kind(), "missing_input");
    }
}
