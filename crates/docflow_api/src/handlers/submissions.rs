use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use docflow_core::models::submission::{DocumentSubmission, SubmissionType};
use docflow_core::workflow::routing::SubmissionDecision;
use docflow_core::Error;

use crate::{error_response, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub actor_id: Uuid,
    pub document_id: Uuid,
    pub to_user: Uuid,
    pub submission_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSubmissionRequest {
    pub actor_id: Uuid,
    pub decision: String,
    pub feedback: Option<String>,
    pub expected_revision: Option<i32>,
}

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

fn parse_decision(value: &str) -> Result<SubmissionDecision, (StatusCode, String)> {
    match value {
        "approve" => Ok(SubmissionDecision::Approve),
        "reject" => Ok(SubmissionDecision::Reject),
        "request_revision" => Ok(SubmissionDecision::RequestRevision),
        "acknowledge" => Ok(SubmissionDecision::Acknowledge),
        other => Err(error_response(Error::Validation(format!(
            "unknown decision '{other}'"
        )))),
    }
}

pub async fn create_submission(
    State(state): State<AppState>,
    Json(req): Json<CreateSubmissionRequest>,
) -> HandlerResult<DocumentSubmission> {
    let submission_type = SubmissionType::parse(&req.submission_type).ok_or_else(|| {
        error_response(Error::Validation(format!(
            "unknown submission type '{}'",
            req.submission_type
        )))
    })?;
    state
        .svc
        .create_submission(req.actor_id, req.document_id, req.to_user, submission_type)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HandlerResult<DocumentSubmission> {
    state
        .svc
        .get_submission(id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn review_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewSubmissionRequest>,
) -> HandlerResult<DocumentSubmission> {
    let decision = parse_decision(&req.decision)?;
    state
        .svc
        .review_submission(
            req.actor_id,
            id,
            decision,
            req.feedback.as_deref(),
            req.expected_revision,
        )
        .await
        .map(Json)
        .map_err(error_response)
}
