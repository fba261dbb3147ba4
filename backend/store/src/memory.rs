use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use specscan_core::{PredictionRecord, PredictionStore};

/// Process-local store for tests and throwaway deployments.
#[derive(Default)]
pub struct InMemoryPredictionStore {
    records: RwLock<Vec<PredictionRecord>>,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far, in insertion order.
    pub async fn records(&self) -> Vec<PredictionRecord> {
        self.records.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PredictionStore for InMemoryPredictionStore {
    async fn save(&self, record: &PredictionRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
