use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::repository::ProposalRepository;
use super::service::{ProposalRequest, ProposalService, ProposalServiceError};
use crate::workflows::ids::LeadId;
use crate::workflows::solar::RoofMeasurement;

/// Router exposing roof qualification and proposal pricing for leads.
pub fn proposal_router<R>(service: Arc<ProposalService<R>>) -> Router
where
    R: ProposalRepository + 'static,
{
    Router::new()
        .route("/api/v1/leads/:lead_id/qualify", post(qualify_handler::<R>))
        .route(
            "/api/v1/leads/:lead_id/proposals",
            post(generate_handler::<R>).get(history_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn qualify_handler<R>(
    State(service): State<Arc<ProposalService<R>>>,
    Path(lead_id): Path<String>,
    axum::Json(measurement): axum::Json<RoofMeasurement>,
) -> Response
where
    R: ProposalRepository + 'static,
{
    match service.qualify(LeadId(lead_id), measurement) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn generate_handler<R>(
    State(service): State<Arc<ProposalService<R>>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<ProposalRequest>,
) -> Response
where
    R: ProposalRepository + 'static,
{
    match service.generate(&LeadId(lead_id), &request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<ProposalService<R>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: ProposalRepository + 'static,
{
    match service.history(&LeadId(lead_id)) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: ProposalServiceError) -> Response {
    let status = match &error {
        ProposalServiceError::MissingQualification(_) => StatusCode::NOT_FOUND,
        ProposalServiceError::InvalidPricing(_) => StatusCode::BAD_REQUEST,
        ProposalServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
