use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// An image received from a client, held in memory for one request.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename as declared by the client
    pub filename: String,
    /// Declared content type of the part, if any
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Structured output of the inference service.
///
/// Opaque to the pipeline: keys and values are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecificationResult(Map<String, Value>);

impl SpecificationResult {
    /// Accepts only a non-empty JSON object; anything else is returned back.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) if !map.is_empty() => Ok(Self(map)),
            other => Err(other),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Durable record of one completed pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: Uuid,
    pub filename: String,
    pub specs: SpecificationResult,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    /// New record stamped with the current time.
    pub fn new(filename: impl Into<String>, specs: SpecificationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            specs,
            created_at: Utc::now(),
        }
    }
}
