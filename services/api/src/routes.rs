use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use solar_crm::error::AppError;
use solar_crm::workflows::commissions::CommissionLedger;
use solar_crm::workflows::projects::{project_router, ProjectRepository, ProjectService};
use solar_crm::workflows::proposals::{proposal_router, ProposalRepository, ProposalService};
use solar_crm::workflows::solar::{
    qualify_lead_roof, QualificationView, RoofMeasurementImporter,
};
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct RoofSurveyScoreRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoofSurveyScoreResponse {
    pub(crate) scored: usize,
    pub(crate) qualified: usize,
    pub(crate) leads: Vec<QualificationView>,
}

pub(crate) fn with_service_routes<P, R, L>(
    proposals: Arc<ProposalService<P>>,
    projects: Arc<ProjectService<R, L>>,
) -> axum::Router
where
    P: ProposalRepository + 'static,
    R: ProjectRepository + 'static,
    L: CommissionLedger + 'static,
{
    proposal_router(proposals)
        .merge(project_router(projects))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/roof-surveys/score",
            axum::routing::post(score_roof_surveys_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Scores a pasted irradiance export without storing anything.
pub(crate) async fn score_roof_surveys_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RoofSurveyScoreRequest>,
) -> Result<Json<RoofSurveyScoreResponse>, AppError> {
    let surveys = RoofMeasurementImporter::from_reader(Cursor::new(payload.csv.into_bytes()))?;

    let leads: Vec<QualificationView> = surveys
        .into_iter()
        .map(|survey| {
            qualify_lead_roof(survey.lead_id, &survey.measurement, &state.assumptions).view()
        })
        .collect();
    let qualified = leads.iter().filter(|lead| lead.roof_viable).count();

    Ok(Json(RoofSurveyScoreResponse {
        scored: leads.len(),
        qualified,
        leads,
    }))
}
