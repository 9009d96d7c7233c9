//! HTTP request handlers.

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Json, Response};
use tracing::{error, warn};
use utoipa::OpenApi;

use memstat_core::model::MemorySnapshot;

use crate::openapi::ApiDoc;
use crate::state::AppState;

// ============================================================
// Health
// ============================================================

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Memory
// ============================================================

#[utoipa::path(
    get,
    path = "/api/v1/memory",
    responses(
        (status = 200, description = "Host memory, allocator and per-process statistics. \
            psEntries is empty when the process list could not be read.", body = MemorySnapshot),
        (status = 500, description = "Snapshot could not be built or serialized")
    )
)]
pub(crate) async fn handle_memory(State(state): AppState) -> Result<Response, StatusCode> {
    // Sampling sleeps for the CPU window, keep it off the async workers
    let snapshot = tokio::task::spawn_blocking(move || {
        match state.source.collect(state.instance_id) {
            Ok(snapshot) => snapshot,
            Err(degraded) => {
                warn!(error = %degraded.source, "serving snapshot without process list");
                degraded.snapshot
            }
        }
    })
    .await
    .map_err(|e| {
        error!(error = %e, "snapshot task failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    json_response(&snapshot)
}

fn json_response(snapshot: &MemorySnapshot) -> Result<Response, StatusCode> {
    let json = serde_json::to_vec(snapshot).map_err(|e| {
        error!(error = %e, "failed to serialize memory snapshot");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, json.len())
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from(json))
        .map_err(|e| {
            error!(error = %e, "failed to build response");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

// ============================================================
// OpenAPI
// ============================================================

pub(crate) async fn handle_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::http::Request;
    use serde_json::Value;
    use tower::util::ServiceExt;

    use memstat_core::collector::{Collector, FixedProbe, MockFs};
    use memstat_core::model::{AllocatorStats, InstanceId};

    use crate::build_router;
    use crate::state::WebAppInner;

    fn instance_id() -> InstanceId {
        "1c0ffee1".parse().unwrap()
    }

    fn test_router(fs: MockFs) -> Router {
        let probe = FixedProbe(AllocatorStats::from_bytes(2048, 0, 0, 0, 0, 0));
        let collector = Collector::new(fs, "/proc", probe)
            .with_sample_window(Duration::ZERO)
            .with_clock_ticks(100);
        build_router(Arc::new(WebAppInner::new(Box::new(collector), instance_id())))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get(test_router(MockFs::typical_system()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_memory_snapshot() {
        let (status, headers, body) =
            get(test_router(MockFs::typical_system()), "/api/v1/memory").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::CONTENT_LENGTH],
            body.len().to_string().as_str()
        );

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], "1c0ffee1");
        assert_eq!(json["total"], 16384000);
        assert_eq!(json["free"], 8192000);
        assert_eq!(json["available"], 12000000);
        assert_eq!(json["runtimeMemoryStats"]["alloc"], 2.0);
        assert_eq!(json["psEntries"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_id_stable_across_requests() {
        let app = test_router(MockFs::typical_system());
        let (_, _, first) = get(app.clone(), "/api/v1/memory").await;
        let (_, _, second) = get(app, "/api/v1/memory").await;

        let first: Value = serde_json::from_slice(&first).unwrap();
        let second: Value = serde_json::from_slice(&second).unwrap();
        assert_eq!(first["id"], second["id"]);
    }

    #[tokio::test]
    async fn test_degraded_snapshot_still_served() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/proc/1000/status");

        let (status, _, body) = get(test_router(fs), "/api/v1/memory").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 16384000);
        assert_eq!(json["psEntries"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_missing_meminfo_served_with_zero_totals() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/proc/meminfo");

        let (status, _, body) = get(test_router(fs), "/api/v1/memory").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["free"], 0);
        assert_eq!(json["available"], 0);
        assert_eq!(json["psEntries"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let (status, _, body) =
            get(test_router(MockFs::typical_system()), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["paths"]["/api/v1/memory"].is_object());
        assert!(json["components"]["schemas"]["MemorySnapshot"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _, _) = get(test_router(MockFs::typical_system()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
