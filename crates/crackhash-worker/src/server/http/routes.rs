//! Inbound HTTP API.
//!
//! - `POST /internal/api/worker/hash/crack/task` accepts a [`TaskRequest`]
//!   and returns once every part of the task has been handed to the pool.
//! - `GET /health` reports liveness.

use crate::server::{http::request::TaskRequest, service::handler::TaskExecutionService};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use crackhash::Error;
use tower_http::trace::TraceLayer;

pub const TASK_PATH: &str = "/internal/api/worker/hash/crack/task";
pub const HEALTH_PATH: &str = "/health";

pub fn router(service: TaskExecutionService) -> Router {
    Router::new()
        .route(TASK_PATH, post(start_task))
        .route(HEALTH_PATH, get(health))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}

/// Failure of an HTTP request, mapped to a status code and plain-text body.
#[derive(Debug)]
pub enum ApiError {
    UnsupportedBody,
    Unprocessable(String),
    Unavailable,
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::ServiceShutdown => Self::Unavailable,
            Error::InvalidRange { .. }
            | Error::InvalidAlphabet { .. }
            | Error::InvalidHash { .. } => Self::Unprocessable(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::UnsupportedBody => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "invalid request body").into_response()
            }
            Self::Unprocessable(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("invalid request body: {reason}"),
            )
                .into_response(),
            Self::Unavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "service is shutting down").into_response()
            }
            Self::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason).into_response(),
        }
    }
}

#[tracing::instrument(skip_all)]
async fn start_task(
    State(service): State<TaskExecutionService>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<()>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!("Rejected task body: {e}");
        ApiError::UnsupportedBody
    })?;

    let task = request.validate().map_err(|reason| {
        tracing::warn!("Rejected task: {reason}");
        ApiError::Unprocessable(reason)
    })?;

    service.submit_task(task).await?;
    Ok(Json(()))
}

async fn health() -> &'static str {
    "ok"
}
