//! Multipart relay to the inference service.
//!
//! One pooled `reqwest::Client` per process. The request future is dropped
//! (and the connection aborted) when the caller goes away.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use specscan_core::{InferenceClient, SpecificationResult, Upload};
use tracing::{debug, info, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;

/// Multipart field the inference service reads the image from.
pub const FILE_FIELD: &str = "file";

pub struct HttpInferenceClient {
    client: Client,
    endpoint: String,
    root_url: String,
    timeout: Duration,
}

impl HttpInferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(InferenceError::Transport)?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            root_url: config.root_url(),
            timeout: config.timeout,
        })
    }

    /// POST the image as field `file` and parse the structured answer.
    pub async fn process_image(&self, upload: &Upload) -> Result<SpecificationResult, InferenceError> {
        info!(
            endpoint = %self.endpoint,
            filename = %upload.filename,
            size_bytes = upload.len(),
            "Relaying image to inference service"
        );

        let form = Form::new().part(FILE_FIELD, file_part(upload));
        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| InferenceError::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status { status: status.as_u16(), body });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| InferenceError::from_reqwest(e, self.timeout))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| InferenceError::Malformed(e.to_string()))?;

        let specs = SpecificationResult::from_value(value).map_err(|other| match other {
            Value::Object(_) => InferenceError::Empty,
            Value::Array(_) => InferenceError::NotAnObject("array"),
            Value::String(_) => InferenceError::NotAnObject("string"),
            Value::Number(_) => InferenceError::NotAnObject("number"),
            Value::Bool(_) => InferenceError::NotAnObject("boolean"),
            Value::Null => InferenceError::NotAnObject("null"),
        })?;

        debug!(fields = specs.len(), "Inference service answered");
        Ok(specs)
    }

    /// Liveness probe against the service root.
    pub async fn health(&self) -> Result<Value, InferenceError> {
        let resp = self
            .client
            .get(&self.root_url)
            .send()
            .await
            .map_err(|e| InferenceError::from_reqwest(e, self.timeout))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status { status: status.as_u16(), body });
        }
        resp.json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))
    }
}

fn file_part(upload: &Upload) -> Part {
    let part = || Part::bytes(upload.data.to_vec()).file_name(upload.filename.clone());
    match upload.content_type.as_deref() {
        Some(mime) => part().mime_str(mime).unwrap_or_else(|_| {
            warn!(content_type = %mime, "Ignoring unparseable content type");
            part()
        }),
        None => part(),
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn extract_specs(&self, upload: &Upload) -> Result<SpecificationResult> {
        Ok(self.process_image(upload).await?)
    }
}
