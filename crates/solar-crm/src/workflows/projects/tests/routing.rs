use super::common::*;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::projects::domain::MilestoneKey;
use crate::workflows::projects::router::{complete_handler, project_handler};
use crate::workflows::projects::{project_router, CompleteMilestoneRequest};

fn post_json(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("request builds")
}

fn empty_post(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn open_route_creates_projects() {
    let (service, _, _) = build_service();
    let router = project_router(Arc::new(service));

    let response = router
        .oneshot(post_json(
            "/api/v1/projects",
            json!({ "lead_id": "lead-400", "agent_id": "agent-1", "project_gross_value": 28500.0 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["lead_id"], "lead-400");
    assert_eq!(payload["progress"]["total"], 15);
    assert_eq!(payload["milestones"][0]["label"], "Deal Closed");
    assert_eq!(payload["milestones"][0]["status"], "pending");
}

#[tokio::test]
async fn reopening_a_lead_returns_ok_with_the_existing_project() {
    let (service, _, _) = build_service();
    let router = project_router(Arc::new(service));
    let body = json!({
        "lead_id": "lead-410",
        "agent_id": "agent-1",
        "project_gross_value": 1000.0
    });

    let first = router
        .clone()
        .oneshot(post_json("/api/v1/projects", body.clone()))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::CREATED);
    let created = read_json_body(first).await;

    let second = router
        .oneshot(post_json("/api/v1/projects", body))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::OK);
    let existing = read_json_body(second).await;
    assert_eq!(existing["project_id"], created["project_id"]);
}

#[tokio::test]
async fn open_route_requires_a_contract_value_for_unpriced_leads() {
    let (service, _, _) = build_service();
    let router = project_router(Arc::new(service));

    let response = router
        .oneshot(post_json(
            "/api/v1/projects",
            json!({ "lead_id": "lead-411", "agent_id": "agent-1" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["error"],
        "no project gross value given and no proposal priced for lead lead-411"
    );
}

#[tokio::test]
async fn complete_route_accepts_an_empty_body() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let project = service
        .open(open_request("lead-401", Some("agent-1")))
        .expect("project opens")
        .record;
    let router = project_router(service);

    let response = router
        .oneshot(empty_post(&format!(
            "/api/v1/projects/{}/milestones/close/complete",
            project.project_id
        )))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["milestone"]["key"], "close");
    assert_eq!(payload["milestone"]["completed_by"], "system");
    assert_eq!(payload["commission_unlock"]["amount"], 2850.0);
    assert_eq!(payload["commission_unlock"]["status"], "pending");
}

#[tokio::test]
async fn complete_route_reports_unmet_dependencies() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let project = service
        .open(open_request("lead-402", Some("agent-1")))
        .expect("project opens")
        .record;
    let router = project_router(service);

    let response = router
        .oneshot(post_json(
            &format!(
                "/api/v1/projects/{}/milestones/permit_approved/complete",
                project.project_id
            ),
            json!({ "completed_by": "agent-1" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], false);
    assert_eq!(payload["error"], "Dependency not met: Deal Closed");
}

#[tokio::test]
async fn complete_handler_maps_double_completion_to_conflict() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let project = service
        .open(open_request("lead-403", Some("agent-1")))
        .expect("project opens")
        .record;
    service
        .complete(
            &project.project_id,
            MilestoneKey::Close,
            CompleteMilestoneRequest::default(),
        )
        .expect("first completion");

    let response = complete_handler(
        State(service),
        Path((project.project_id.0.clone(), "close".to_string())),
        Bytes::new(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Milestone already completed");
}

#[tokio::test]
async fn complete_handler_rejects_unknown_milestones() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let project = service
        .open(open_request("lead-404", Some("agent-1")))
        .expect("project opens")
        .record;

    let response = complete_handler(
        State(service),
        Path((project.project_id.0.clone(), "roof_party".to_string())),
        Bytes::new(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Milestone not found");
}

#[tokio::test]
async fn complete_handler_rejects_malformed_bodies() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let project = service
        .open(open_request("lead-405", Some("agent-1")))
        .expect("project opens")
        .record;

    let response = complete_handler(
        State(service),
        Path((project.project_id.0.clone(), "close".to_string())),
        Bytes::from_static(b"{\"milestone_percent\": \"lots\"}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn complete_handler_returns_not_found_for_missing_projects() {
    let (service, _, _) = build_service();

    let response = complete_handler(
        State(Arc::new(service)),
        Path(("project-missing".to_string(), "close".to_string())),
        Bytes::new(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_handler_returns_not_found() {
    let (service, _, _) = build_service();

    let response =
        project_handler(State(Arc::new(service)), Path("project-missing".to_string())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn commission_route_summarizes_agent_earnings() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let project = service
        .open(open_request("lead-406", Some("agent-9")))
        .expect("project opens")
        .record;
    service
        .complete(
            &project.project_id,
            MilestoneKey::Close,
            CompleteMilestoneRequest::default(),
        )
        .expect("close completes");
    let router = project_router(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/agents/agent-9/commissions")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["agent_id"], "agent-9");
    assert_eq!(payload["pending"], 2850.0);
    assert_eq!(payload["total_lifetime"], 2850.0);
}
