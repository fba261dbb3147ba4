use anyhow::Result;
use async_trait::async_trait;

use crate::types::{PredictionRecord, SpecificationResult, Upload};

/// External service that extracts product specifications from an image.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Human-readable name used in logs (e.g., "http").
    fn name(&self) -> &str;

    /// Send the image and return the structured result.
    ///
    /// Any transport error, non-success status or malformed body is an error.
    async fn extract_specs(&self, upload: &Upload) -> Result<SpecificationResult>;
}

/// Append-only durable store for prediction records.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Persist one record. Returns only once the write is durable.
    async fn save(&self, record: &PredictionRecord) -> Result<()>;
}
