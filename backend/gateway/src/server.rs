//! HTTP server and routing.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use specscan_core::SpecificationResult;
use specscan_logging::{PipelineEvent, PipelineEventLogger};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::ApiError;
use crate::health;
use crate::intake;
use crate::pipeline::SpecPipeline;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<SpecPipeline>,
}

impl GatewayState {
    pub fn new(pipeline: SpecPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the router with every route and layer.
pub fn build_router(state: GatewayState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/api", get(health::api_status))
        .route("/api/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server and runs until the process is told to stop.
#[instrument(skip(state, config))]
pub async fn start_server(addr: SocketAddr, state: GatewayState, config: &GatewayConfig) -> Result<()> {
    let app = build_router(state, config);

    let listener = TcpListener::bind(&addr).await?;
    info!("specscan gateway listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("specscan gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Handler for `POST /api/upload`.
async fn upload_image(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SpecificationResult>, ApiError> {
    let request_id = Uuid::new_v4();

    let upload = match intake::read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            PipelineEventLogger::log_event(request_id, intake_failure_event(&e));
            return Err(e);
        }
    };

    let specs = state.pipeline.run(request_id, upload).await?;
    Ok(Json(specs))
}

fn intake_failure_event(err: &ApiError) -> PipelineEvent {
    match err {
        ApiError::PayloadTooLarge => PipelineEvent::UploadTooLarge,
        ApiError::Pipeline(_) => PipelineEvent::UploadMissing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingStore, StubInference};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use specscan_core::PredictionStore;
    use specscan_inference::{HttpInferenceClient, InferenceConfig};
    use specscan_store::{InMemoryPredictionStore, SqlitePredictionStore};
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "specscan-test-boundary";

    struct Part<'a> {
        name: &'a str,
        filename: Option<&'a str>,
        data: &'a [u8],
    }

    fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match part.filename {
                Some(filename) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                    part.name, filename
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn image(filename: &str) -> Part<'_> {
        Part { name: "image", filename: Some(filename), data: &[0xFF, 0xD8, 0xFF, 0xE0] }
    }

    fn app(inference: Arc<StubInference>, store: Arc<dyn PredictionStore>) -> Router {
        let pipeline = SpecPipeline::new(inference, store, Duration::from_secs(5));
        build_router(GatewayState::new(pipeline), &GatewayConfig::default())
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn phone_upload_round_trips_specs() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme", "ram_gb": 8})));
        let store = Arc::new(InMemoryPredictionStore::new());

        let response = app(inference.clone(), store.clone())
            .oneshot(upload_request(&[image("phone.jpg")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"brand": "Acme", "ram_gb": 8}));

        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "phone.jpg");
        assert_eq!(records[0].specs.clone().into_value(), json!({"brand": "Acme", "ram_gb": 8}));
    }

    #[tokio::test]
    async fn missing_image_field_is_rejected_without_calls() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme"})));
        let store = Arc::new(FailingStore::default());

        let request = upload_request(&[Part { name: "photo", filename: Some("phone.jpg"), data: b"abc" }]);
        let response = app(inference.clone(), store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No image file provided."}));
        assert_eq!(inference.calls(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn text_field_named_image_does_not_count() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme"})));
        let store = Arc::new(FailingStore::default());

        let request = upload_request(&[Part { name: "image", filename: None, data: b"not a file" }]);
        let response = app(inference.clone(), store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(inference.calls(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn non_multipart_request_is_missing_input() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme"})));
        let store = Arc::new(FailingStore::default());

        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"image": "phone.jpg"}"#))
            .unwrap();
        let response = app(inference.clone(), store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No image file provided."}));
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn first_image_part_wins() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme"})));
        let store = Arc::new(InMemoryPredictionStore::new());

        let request = upload_request(&[
            Part { name: "note", filename: None, data: b"front of box" },
            image("front.jpg"),
            image("back.jpg"),
        ]);
        let response = app(inference.clone(), store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(inference.calls(), 1);
        assert_eq!(store.records().await[0].filename, "front.jpg");
    }

    #[tokio::test]
    async fn inference_failure_is_generic_server_error() {
        let inference = Arc::new(StubInference::failing("502 Bad Gateway: upstream OCR crashed"));
        let store = Arc::new(InMemoryPredictionStore::new());

        let response = app(inference.clone(), store.clone())
            .oneshot(upload_request(&[image("phone.jpg")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "Failed to process image."}));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn persistence_failure_hides_inference_result() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme", "ram_gb": 8})));
        let store = Arc::new(FailingStore::default());

        let response = app(inference.clone(), store.clone())
            .oneshot(upload_request(&[image("phone.jpg")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "Failed to process image."}));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn oversized_upload_is_refused() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme"})));
        let store = Arc::new(InMemoryPredictionStore::new());
        let pipeline = SpecPipeline::new(inference.clone(), store.clone(), Duration::from_secs(5));
        let config = GatewayConfig { max_upload_bytes: 64, ..GatewayConfig::default() };
        let router = build_router(GatewayState::new(pipeline), &config);

        let big = vec![0u8; 4096];
        let request = upload_request(&[Part { name: "image", filename: Some("huge.png"), data: &big }]);
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(inference.calls(), 0);
        assert_eq!(store.count().await, 0);
    }

    #[test]
    fn intake_failures_map_to_distinct_events() {
        assert!(matches!(
            intake_failure_event(&ApiError::PayloadTooLarge),
            PipelineEvent::UploadTooLarge
        ));
        assert!(matches!(
            intake_failure_event(&ApiError::from(specscan_core::PipelineError::MissingInput)),
            PipelineEvent::UploadMissing
        ));
    }

    #[tokio::test]
    async fn api_root_reports_running() {
        let inference = Arc::new(StubInference::answering(json!({"brand": "Acme"})));
        let store = Arc::new(InMemoryPredictionStore::new());

        let request = Request::builder().uri("/api").body(Body::empty()).unwrap();
        let response = app(inference, store).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"message": "Backend API is running"}));
    }

    async fn spawn_ml_service(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn live_app(base_url: &str, store: Arc<SqlitePredictionStore>) -> Router {
        let inference = HttpInferenceClient::new(&InferenceConfig::new(base_url)).unwrap();
        let pipeline = SpecPipeline::new(Arc::new(inference), store, Duration::from_secs(5));
        build_router(GatewayState::new(pipeline), &GatewayConfig::default())
    }

    #[tokio::test]
    async fn end_to_end_against_http_service_and_sqlite() {
        let ml = Router::new().route(
            "/process-image/",
            post(|| async { Json(json!({"item_weight": "150 gram", "voltage": null})) }),
        );
        let base = spawn_ml_service(ml).await;
        let store = Arc::new(SqlitePredictionStore::in_memory().unwrap());

        let response = live_app(&base, store.clone())
            .oneshot(upload_request(&[image("tea.jpg")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"item_weight": "150 gram", "voltage": null}));
        let recent = store.recent(5).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].filename, "tea.jpg");
    }

    #[tokio::test]
    async fn unreachable_service_yields_500_and_no_record() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let store = Arc::new(SqlitePredictionStore::in_memory().unwrap());

        let response = live_app(&format!("http://{addr}"), store.clone())
            .oneshot(upload_request(&[image("phone.jpg")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "Failed to process image."}));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
