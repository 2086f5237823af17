use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use woodchat_actors::{faq, AskError};
use woodchat_common::{AskRequest, AskResponse, ErrorBody, ReloadResponse};

type AppStateArc = Arc<AppState>;

/// Failures surfaced by the API as JSON error bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No question provided")]
    NoQuestion,

    #[error("An error occurred while processing your question")]
    Ask(String),

    #[error("Failed to reload data")]
    Reload(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        match self {
            ApiError::NoQuestion => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error,
                    details: None,
                }),
            )
                .into_response(),
            ApiError::Ask(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error,
                    details: Some(details),
                }),
            )
                .into_response(),
            ApiError::Reload(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReloadResponse {
                    success: false,
                    message: None,
                    error: Some(error),
                    details: Some(details),
                }),
            )
                .into_response(),
        }
    }
}

pub fn ask_routes() -> Router<AppStateArc> {
    Router::new().route("/api/ask", post(ask))
}

pub fn admin_routes() -> Router<AppStateArc> {
    Router::new().route("/admin/reload_data", get(reload_data))
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/healthz", get(health))
}

async fn ask(
    State(state): State<AppStateArc>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = match body {
        Ok(Json(req)) => req.question,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "api.ask.bad_body");
            return Err(ApiError::NoQuestion);
        }
    };

    match faq::ask(&state.faq, &question).await {
        Ok(resp) => Ok(Json(resp)),
        Err(AskError::EmptyQuestion) => Err(ApiError::NoQuestion),
        Err(e) => {
            error!(error = %e, "api.ask.failed");
            Err(ApiError::Ask(e.to_string()))
        }
    }
}

async fn reload_data(
    State(state): State<AppStateArc>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let count = faq::reload_data(&state.faq).await.map_err(|e| {
        error!(error = %e, "api.reload.failed");
        ApiError::Reload(e.to_string())
    })?;
    info!(count, "api.reload");
    Ok(Json(ReloadResponse {
        success: true,
        message: Some(format!("Reloaded {count} FAQ entries")),
        ..Default::default()
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
