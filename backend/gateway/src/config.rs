use std::time::Duration;

/// Default cap on the whole request body (multipart overhead included).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub max_upload_bytes: usize,
    /// Bound on the inference call as seen by the pipeline
    pub inference_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            inference_timeout: Duration::from_secs(120),
        }
    }
}
