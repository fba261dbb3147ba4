//! Relay-and-persist orchestration for one upload.
//!
//! Strictly linear: inference, then persistence, then the answer. Every
//! failure is terminal for the request and nothing is retried. A result is
//! only handed back once its record has been written; if the write fails the
//! caller gets an error even though inference succeeded.

use std::sync::Arc;
use std::time::Duration;

use specscan_core::{
    InferenceClient, PipelineError, PredictionRecord, PredictionStore, SpecificationResult, Upload,
};
use specscan_logging::{redact_sensitive_data, PipelineEvent, PipelineEventLogger};
use tokio::time::timeout;
use tracing::{error, instrument};
use uuid::Uuid;

pub struct SpecPipeline {
    inference: Arc<dyn InferenceClient>,
    store: Arc<dyn PredictionStore>,
    inference_timeout: Duration,
}

impl SpecPipeline {
    pub fn new(
        inference: Arc<dyn InferenceClient>,
        store: Arc<dyn PredictionStore>,
        inference_timeout: Duration,
    ) -> Self {
        Self {
            inference,
            store,
            inference_timeout,
        }
    }

    #[instrument(skip_all, fields(request_id = %request_id, filename = %upload.filename))]
    pub async fn run(&self, request_id: Uuid, upload: Upload) -> Result<SpecificationResult, PipelineError> {
        PipelineEventLogger::log_event(
            request_id,
            PipelineEvent::UploadReceived {
                filename: upload.filename.clone(),
                size_bytes: upload.len(),
            },
        );

        let specs = match timeout(self.inference_timeout, self.inference.extract_specs(&upload)).await {
            Ok(Ok(specs)) => specs,
            Ok(Err(e)) => return Err(self.inference_failed(request_id, format!("{e:#}"))),
            Err(_) => {
                return Err(self.inference_failed(
                    request_id,
                    format!("no answer within {:?}", self.inference_timeout),
                ));
            }
        };

        let Upload { filename, .. } = upload;
        let record = PredictionRecord::new(filename, specs);

        if let Err(e) = self.store.save(&record).await {
            let detail = redact_sensitive_data(&format!("{e:#}"));
            let err = PipelineError::PersistenceFailure(detail.clone());
            error!(record_id = %record.id, error_kind = err.kind(), error = %detail, "Failed to persist prediction");
            PipelineEventLogger::log_event(request_id, PipelineEvent::PersistenceFailed { error_msg: detail });
            return Err(err);
        }

        PipelineEventLogger::log_event(
            request_id,
            PipelineEvent::PredictionStored {
                record_id: record.id,
                filename: record.filename.clone(),
                fields: record.specs.len(),
            },
        );
        Ok(record.specs)
    }

    /// Downstream detail is scrubbed once here, before it reaches any log line.
    fn inference_failed(&self, request_id: Uuid, detail: String) -> PipelineError {
        let detail = redact_sensitive_data(&detail);
        let err = PipelineError::InferenceFailure(detail.clone());
        error!(
            client = self.inference.name(),
            error_kind = err.kind(),
            error = %detail,
            "Inference call failed"
        );
        PipelineEventLogger::log_event(request_id, PipelineEvent::InferenceFailed { error_msg: detail });
        err
    }
}
