use std::time::Duration;

use thiserror::Error;

/// Ways an extraction call can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference service unreachable: {0}")]
    Transport(reqwest::Error),

    #[error("inference service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("inference service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference service returned malformed JSON: {0}")]
    Malformed(String),

    #[error("inference service returned a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("inference service returned an empty specification")]
    Empty,
}

impl InferenceError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout(timeout)
        } else {
            InferenceError::Transport(err)
        }
    }
}
