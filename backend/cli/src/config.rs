use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use specscan_gateway::GatewayConfig;
use specscan_gateway::config::DEFAULT_MAX_UPLOAD_BYTES;
use specscan_inference::InferenceConfig;

/// specscan runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Prediction store connection string (path, `sqlite://path` or `:memory:`)
    pub database_url: String,
    /// Inference service location and timeouts
    pub inference: InferenceConfig,
    /// Request body cap for uploads
    pub max_upload_bytes: usize,
    /// Directory for rolling JSON logs; console only when unset
    pub log_dir: Option<String>,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3001,
            database_url: "specscan.db".to_string(),
            inference: InferenceConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| {
            var(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        let inference = InferenceConfig {
            base_url: var("ML_SERVICE_URL").unwrap_or(defaults.inference.base_url),
            timeout: secs("ML_SERVICE_TIMEOUT_SECS", defaults.inference.timeout),
            connect_timeout: secs("ML_SERVICE_CONNECT_TIMEOUT_SECS", defaults.inference.connect_timeout),
        };

        Self {
            bind_address: var("SPECSCAN_BIND").unwrap_or(defaults.bind_address),
            port: var("SPECSCAN_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: var("SPECSCAN_DB").unwrap_or(defaults.database_url),
            inference,
            max_upload_bytes: var("SPECSCAN_MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            log_dir: var("SPECSCAN_LOG_DIR").filter(|d| !d.is_empty()),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.bind_address, self.port))
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            max_upload_bytes: self.max_upload_bytes,
            inference_timeout: self.inference.timeout,
        }
    }
}
