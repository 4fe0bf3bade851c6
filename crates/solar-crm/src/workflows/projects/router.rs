use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::completion::MilestoneError;
use super::domain::MilestoneKey;
use super::repository::ProjectRepository;
use super::service::{
    CompleteMilestoneRequest, OpenProjectRequest, ProjectService, ProjectServiceError,
};
use crate::workflows::commissions::CommissionLedger;
use crate::workflows::ids::{AgentId, ProjectId};
use crate::workflows::storage::RepositoryError;

/// Router exposing projects, milestone completion, and agent commissions.
pub fn project_router<R, L>(service: Arc<ProjectService<R, L>>) -> Router
where
    R: ProjectRepository + 'static,
    L: CommissionLedger + 'static,
{
    Router::new()
        .route("/api/v1/projects", post(open_handler::<R, L>))
        .route("/api/v1/projects/:project_id", get(project_handler::<R, L>))
        .route(
            "/api/v1/projects/:project_id/milestones/:milestone_key/complete",
            post(complete_handler::<R, L>),
        )
        .route(
            "/api/v1/agents/:agent_id/commissions",
            get(commission_summary_handler::<R, L>),
        )
        .with_state(service)
}

pub(crate) async fn open_handler<R, L>(
    State(service): State<Arc<ProjectService<R, L>>>,
    axum::Json(request): axum::Json<OpenProjectRequest>,
) -> Response
where
    R: ProjectRepository + 'static,
    L: CommissionLedger + 'static,
{
    match service.open(request) {
        Ok(opened) => {
            let status = if opened.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(opened.record.view())).into_response()
        }
        Err(error @ ProjectServiceError::MissingGrossValue(_)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn project_handler<R, L>(
    State(service): State<Arc<ProjectService<R, L>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    L: CommissionLedger + 'static,
{
    match service.get(&ProjectId(project_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(ProjectServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "project not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// The body is optional; an empty body completes as the system actor with
/// the configured payout.
pub(crate) async fn complete_handler<R, L>(
    State(service): State<Arc<ProjectService<R, L>>>,
    Path((project_id, milestone_key)): Path<(String, String)>,
    body: Bytes,
) -> Response
where
    R: ProjectRepository + 'static,
    L: CommissionLedger + 'static,
{
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CompleteMilestoneRequest::default()
    } else {
        match serde_json::from_slice::<CompleteMilestoneRequest>(&body) {
            Ok(request) => request,
            Err(error) => {
                return failure(StatusCode::BAD_REQUEST, format!("invalid request body: {error}"))
            }
        }
    };

    let Ok(key) = milestone_key.parse::<MilestoneKey>() else {
        return failure(StatusCode::NOT_FOUND, "Milestone not found".to_string());
    };

    match service.complete(&ProjectId(project_id), key, request) {
        Ok(report) => {
            let payload = json!({
                "success": true,
                "milestone": report.milestone,
                "commission_unlock": report.commission_unlock,
                "progress": report.progress,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(ProjectServiceError::Milestone(error)) => {
            let status = match error {
                MilestoneError::NotFound { .. } => StatusCode::NOT_FOUND,
                MilestoneError::AlreadyCompleted { .. } => StatusCode::CONFLICT,
                MilestoneError::DependencyNotMet { .. } => StatusCode::BAD_REQUEST,
            };
            failure(status, error.to_string())
        }
        Err(error @ ProjectServiceError::InvalidOverride { .. }) => {
            failure(StatusCode::BAD_REQUEST, error.to_string())
        }
        Err(ProjectServiceError::Repository(RepositoryError::NotFound)) => {
            failure(StatusCode::NOT_FOUND, "project not found".to_string())
        }
        Err(other) => failure(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn commission_summary_handler<R, L>(
    State(service): State<Arc<ProjectService<R, L>>>,
    Path(agent_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    L: CommissionLedger + 'static,
{
    match service.commission_summary(&AgentId(agent_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn failure(status: StatusCode, error: String) -> Response {
    let payload = json!({
        "success": false,
        "error": error,
    });
    (status, axum::Json(payload)).into_response()
}
