//! Pipeline Event Logger
//!
//! One structured event per stage outcome of an ingestion request, emitted
//! under the `pipeline_events` target so it can be filtered or routed apart
//! from ordinary logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    UploadReceived {
        filename: String,
        size_bytes: usize,
    },
    UploadMissing,
    UploadTooLarge,
    InferenceFailed {
        error_msg: String,
    },
    PersistenceFailed {
        error_msg: String,
    },
    PredictionStored {
        record_id: Uuid,
        filename: String,
        fields: usize,
    },
}

impl PipelineEvent {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            PipelineEvent::UploadMissing
                | PipelineEvent::UploadTooLarge
                | PipelineEvent::InferenceFailed { .. }
                | PipelineEvent::PersistenceFailed { .. }
        )
    }
}

#[derive(Debug, Serialize)]
pub struct PipelineEventEntry {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct PipelineEventLogger;

impl PipelineEventLogger {
    /// Log one stage outcome for the given request, scrubbing error text first.
    pub fn log_event(request_id: Uuid, mut event: PipelineEvent) -> PipelineEventEntry {
        match &mut event {
            PipelineEvent::InferenceFailed { error_msg }
            | PipelineEvent::PersistenceFailed { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            _ => {}
        }

        let entry = PipelineEventEntry {
            request_id,
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if entry.event.is_failure() {
            warn!(target: "pipeline_events", request_id = %request_id, event = %json, "Pipeline event");
        } else {
            info!(target: "pipeline_events", request_id = %request_id, event = %json, "Pipeline event");
        }
        entry
    }
}
