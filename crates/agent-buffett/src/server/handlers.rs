//! HTTP request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use super::AppState;
use super::types::{AnalyzeRequest, AnalyzeResponse, HealthResponse};
use crate::analysis::analyze_instances;

/// POST /analyze - Run every instance through the pipeline.
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let instances = match body {
        Ok(Json(request)) => request.instances,
        Err(rejection) => {
            warn!("Rejected analyze request: {}", rejection.body_text());
            return bad_request();
        }
    };
    if instances.is_empty() {
        return bad_request();
    }

    info!("Analyzing {} instances", instances.len());
    match analyze_instances(
        state.analyzer.as_ref(),
        instances,
        state.max_concurrent_posts,
    )
    .await
    {
        Ok(outputs) => (StatusCode::OK, Json(AnalyzeResponse { outputs })).into_response(),
        Err(e) => {
            warn!("Analysis failed: {}", e);
            e.into_response()
        }
    }
}

/// GET /health - Liveness probe, no dependency checks.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, Json(AnalyzeResponse::default())).into_response()
}
