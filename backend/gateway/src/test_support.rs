//! Collaborator doubles shared by the gateway tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use specscan_core::{InferenceClient, PredictionRecord, PredictionStore, SpecificationResult, Upload};

pub fn phone_upload() -> Upload {
    Upload::new("phone.jpg", Some("image/jpeg".to_string()), vec![0xFF, 0xD8, 0xFF, 0xE0])
}

enum Reply {
    Specs(Value),
    Fail(String),
    Hang,
}

pub struct StubInference {
    reply: Reply,
    calls: AtomicUsize,
}

impl StubInference {
    pub fn answering(body: Value) -> Self {
        Self { reply: Reply::Specs(body), calls: AtomicUsize::new(0) }
    }

    pub fn failing(message: &str) -> Self {
        Self { reply: Reply::Fail(message.to_string()), calls: AtomicUsize::new(0) }
    }

    pub fn hanging() -> Self {
        Self { reply: Reply::Hang, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceClient for StubInference {
    fn name(&self) -> &str {
        "stub"
    }

    async fn extract_specs(&self, _upload: &Upload) -> Result<SpecificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Specs(body) => SpecificationResult::from_value(body.clone())
                .map_err(|_| anyhow!("stub body is not a specification")),
            Reply::Fail(message) => Err(anyhow!("{message}")),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(anyhow!("woke up"))
            }
        }
    }
}

/// Store whose every write fails.
#[derive(Default)]
pub struct FailingStore {
    message: Option<String>,
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn with_message(message: &str) -> Self {
        Self { message: Some(message.to_string()), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionStore for FailingStore {
    async fn save(&self, _record: &PredictionRecord) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("{}", self.message.as_deref().unwrap_or("database is locked")))
    }
}
