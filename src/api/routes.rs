use axum::{
    body::Bytes,
    routing::get,
    Router,
    extract::{Json, Query, State},
};
use serde_json::Value;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::api::docs;
use crate::api::models::{UppercaseQuery, UppercaseResponse};
use crate::error::{AppError, Result};
use crate::extract::{urls_from_payload, ExtractJob};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/uppercase", get(uppercase_handler))
        .route("/extract", get(demo_page_handler).post(extract_handler))
        .route("/extract/pages", get(demo_pages_handler))
        .route("/apispec_1.json", get(docs::openapi_spec))
        .route("/apidocs", get(docs::swagger_ui))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn uppercase_handler(Query(query): Query<UppercaseQuery>) -> Result<Json<UppercaseResponse>> {
    let text = query
        .text
        .ok_or_else(|| AppError::InvalidRequest("Missing text query parameter".to_string()))?;

    Ok(Json(UppercaseResponse {
        text: text.to_uppercase(),
    }))
}

async fn extract_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let urls = urls_from_payload(&body).inspect_err(|err| {
        tracing::warn!(error = %err, "Rejected extract request");
    })?;

    run_extraction(&state, ExtractJob::pages(urls)).await
}

async fn demo_page_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    run_extraction(&state, ExtractJob::demo_page()).await
}

async fn demo_pages_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    run_extraction(&state, ExtractJob::demo_pages()).await
}

/// Hands the job to the provider and relays its JSON untouched.
async fn run_extraction(state: &AppState, job: ExtractJob) -> Result<Json<Value>> {
    tracing::info!(urls = ?job.urls, "Starting extraction");
    let start_time = std::time::Instant::now();
    let timeout = state.config.extract_timeout;

    let result = tokio::time::timeout(timeout, state.extractor.extract(&job)).await;
    let elapsed = start_time.elapsed();

    match result {
        Ok(Ok(data)) => {
            tracing::info!(?elapsed, "Extraction succeeded");
            Ok(Json(data))
        }
        Ok(Err(err)) => {
            tracing::error!(?elapsed, error = %err, "Extraction failed");
            Err(err.into())
        }
        Err(_) => {
            tracing::error!(?elapsed, "Extraction timed out");
            Err(AppError::ExtractionFailed(format!(
                "Extraction timed out after {:?}",
                timeout
            )))
        }
    }
}
