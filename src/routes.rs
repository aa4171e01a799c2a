use axum::{Json, Router, extract::State, http::{StatusCode, header}, response::{IntoResponse, Response}, routing::{get, post}};
use std::sync::Arc;
use parking_lot::Mutex;
use serde_json::json;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;
use chrono::Utc;

use crate::{error::GenerationError, models::{GenerateBody, GenerateResponse, GenerationRequest, StudyMaterial}, pipeline::StudyPipeline, render::render_markdown};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: StudyPipeline,
    /// Id of the generation currently running, if any.
    pub in_flight: Arc<Mutex<Option<Uuid>>>,
}

impl AppState {
    pub fn new(pipeline: StudyPipeline) -> Self {
        Self { pipeline, in_flight: Arc::default() }
    }

    fn claim(&self, request_id: Uuid) -> Result<InFlightGuard, ApiError> {
        let mut slot = self.in_flight.lock();
        if let Some(pending) = *slot {
            return Err(ApiError::Busy(pending));
        }
        *slot = Some(request_id);
        Ok(InFlightGuard { slot: self.in_flight.clone() })
    }
}

/// Frees the single-flight slot however the handler exits, including when
/// the client goes away and the handler future is dropped.
struct InFlightGuard {
    slot: Arc<Mutex<Option<Uuid>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

#[derive(Debug)]
pub enum ApiError {
    Generation(GenerationError),
    Busy(Uuid),
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self { ApiError::Generation(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Busy(_) => (
                StatusCode::CONFLICT,
                "busy",
                "A study guide is already being generated. Please wait for it to finish.".to_string(),
            ),
            ApiError::Generation(e) => {
                let status = match e {
                    GenerationError::EmptyInput => StatusCode::BAD_REQUEST,
                    GenerationError::MissingCredential { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    GenerationError::Provider(_)
                    | GenerationError::MalformedOutput(_)
                    | GenerationError::SchemaMismatch { .. } => StatusCode::BAD_GATEWAY,
                };
                (status, e.kind(), e.to_string())
            }
        };
        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

async fn run_generation(state: &AppState, body: GenerateBody) -> Result<GenerateResponse, ApiError> {
    let request = GenerationRequest::new(body.lecture_text, body.language)?;
    let request_id = Uuid::new_v4();
    let _guard = state.claim(request_id).inspect_err(|_| {
        warn!(%request_id, "⏳ Rejected: another generation is in flight");
    })?;

    info!(%request_id, language = %request.language, "🚀 Generating study material");
    let material = state.pipeline.run(&request).await.inspect_err(|e| {
        error!(%request_id, kind = e.kind(), "❌ Generation failed: {}", e);
    })?;

    Ok(GenerateResponse { request_id, language: request.language, generated_at: Utc::now(), material })
}

pub async fn generate_study_material(State(state): State<AppState>, Json(body): Json<GenerateBody>) -> Result<Json<GenerateResponse>, ApiError> {
    run_generation(&state, body).await.map(Json)
}

/// Renders a study guide the client already holds; never calls the provider.
pub async fn export_study_material(Json(material): Json<StudyMaterial>) -> Response {
    let markdown = render_markdown(&material);
    let disposition = format!("attachment; filename=\"study_guide_{}.md\"", Utc::now().format("%Y%m%d_%H%M%S"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        markdown,
    ).into_response()
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/study-material", post(generate_study_material))
        .route("/api/study-material/export", post(export_study_material))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
