//! HTTP route handlers for the text-matching API.

use crate::error::MatchError;
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

// --- Request/Response types ---

#[derive(Deserialize)]
pub struct AddRequest {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckRequest {
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub matched_text: Option<String>,
    pub similarity_score: Option<f32>,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub matched: bool,
    pub matched_text: Option<String>,
    pub similarity_score: Option<f32>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub stored_count: usize,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub total_queries: u64,
    pub total_adds: u64,
    pub total_deletes: u64,
    pub avg_query_latency_us: f64,
    pub p50_query_latency_us: f64,
    pub p95_query_latency_us: f64,
    pub p99_query_latency_us: f64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

// --- Router ---

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add-embedding", post(add_embedding))
        .route("/query-embedding", post(query_embedding))
        .route("/delete-text", post(delete_text))
        .route("/delete-all", post(delete_all))
        .route("/show-all", get(show_all))
        .route("/check-text", post(check_text))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

// --- Helpers ---

fn require_text(value: Option<String>, message: &str) -> Result<String, HandlerError> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )),
    }
}

fn lock_poisoned() -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Lock poisoned".to_string(),
        }),
    )
}

fn internal_error(e: MatchError) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// --- Handlers ---

async fn add_embedding(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let text = require_text(req.text, "Text is required")?;

    {
        let mut store = state.store.write().map_err(|_| lock_poisoned())?;
        store.add(&text).map_err(internal_error)?;
    }

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_add();
    }

    Ok(Json(MessageResponse {
        message: format!("Added embedding for '{}'", text),
    }))
}

async fn query_embedding(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, HandlerError> {
    let query = require_text(req.query, "Query text is required")?;

    let start = Instant::now();
    let result = {
        let store = state.store.read().map_err(|_| lock_poisoned())?;
        store.query(&query).map_err(internal_error)?
    };
    let elapsed = start.elapsed();

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_query(elapsed);
    }

    let (matched_text, similarity_score) = match result {
        Some(hit) => (Some(hit.text), Some(hit.score)),
        None => (None, None),
    };

    Ok(Json(QueryResponse {
        query,
        matched_text,
        similarity_score,
    }))
}

async fn delete_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let text = require_text(req.text, "Text is required")?;

    let removed = {
        let mut store = state.store.write().map_err(|_| lock_poisoned())?;
        store.delete_exact(&text).map_err(internal_error)?
    };

    if removed > 0 {
        if let Ok(mut metrics) = state.metrics.write() {
            metrics.record_delete();
        }
    }

    let message = if removed == 0 {
        format!("No matches found for '{}'", text)
    } else {
        format!("Deleted {} instance(s) of '{}'", removed, text)
    };
    Ok(Json(MessageResponse { message }))
}

async fn delete_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, HandlerError> {
    {
        let mut store = state.store.write().map_err(|_| lock_poisoned())?;
        store.delete_all().map_err(internal_error)?;
    }

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_delete();
    }

    Ok(Json(MessageResponse {
        message: "All embeddings deleted".to_string(),
    }))
}

async fn show_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;

    if store.is_empty() {
        return Ok(Json(
            serde_json::json!({"message": "No embeddings stored yet"}),
        ));
    }
    Ok(Json(serde_json::json!({"stored_values": store.list()})))
}

async fn check_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, HandlerError> {
    let text = require_text(req.text, "Text is required")?;

    let start = Instant::now();
    let decision = {
        let store = state.store.read().map_err(|_| lock_poisoned())?;
        store.check(&text).map_err(internal_error)?
    };
    let elapsed = start.elapsed();

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_query(elapsed);
    }

    Ok(Json(CheckResponse {
        matched: decision.matched,
        matched_text: decision.matched_text,
        similarity_score: decision.similarity_score,
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let count = state.store.read().map(|s| s.len()).unwrap_or(0);

    Json(HealthResponse {
        status: "ok".to_string(),
        stored_count: count,
    })
}

async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricsResponse>, HandlerError> {
    let metrics = state.metrics.read().map_err(|_| lock_poisoned())?;

    Ok(Json(MetricsResponse {
        total_queries: metrics.total_queries(),
        total_adds: metrics.total_adds(),
        total_deletes: metrics.total_deletes(),
        avg_query_latency_us: metrics.avg_query_latency_us(),
        p50_query_latency_us: metrics.percentile_query_latency_us(50.0),
        p95_query_latency_us: metrics.percentile_query_latency_us(95.0),
        p99_query_latency_us: metrics.percentile_query_latency_us(99.0),
    }))
}
