use std::time::Duration;

/// Path appended to the service base URL for extraction requests.
pub const PROCESS_IMAGE_PATH: &str = "/process-image/";

/// Connection settings for the inference service.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL, e.g. `http://ml-service:8000`
    pub base_url: String,
    /// Upper bound on one extraction call, including reading the body
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl InferenceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the extraction endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), PROCESS_IMAGE_PATH)
    }

    /// Root URL of the service, which answers a liveness probe.
    pub fn root_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}
