use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use docflow_core::models::document::{Document, Priority};
use docflow_core::models::signature::SignatureType;
use docflow_core::Error;
use docflow_service::documents::CreateDocumentParams;

use crate::{error_response, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub actor_id: Uuid,
    pub name: String,
    pub doc_type: String,
    pub department: String,
    pub file_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub approval_chain: Vec<Uuid>,
    #[serde(default)]
    pub assigned_to: Vec<Uuid>,
}

/// Shared body for the plain transitions (submit, start-review, resubmit,
/// archive). `expected_revision` is the revision the client last read.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub actor_id: Uuid,
    pub expected_revision: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub actor_id: Uuid,
    pub comment: Option<String>,
    pub expected_revision: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub actor_id: Uuid,
    pub feedback: String,
    pub expected_revision: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub actor_id: Uuid,
    pub signature_type: String,
    pub comment: Option<String>,
    pub expected_revision: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub actor_id: Uuid,
    pub version: i32,
    pub expected_revision: Option<i32>,
}

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

pub async fn create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> HandlerResult<Document> {
    let params = CreateDocumentParams {
        name: req.name,
        doc_type: req.doc_type,
        department: req.department,
        file_url: req.file_url,
        tags: req.tags,
        priority: req.priority.unwrap_or(Priority::Medium),
        approval_chain: req.approval_chain,
        assigned_to: req.assigned_to,
    };
    state
        .svc
        .create_document(req.actor_id, params)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Document> {
    state
        .svc
        .get_document(id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn submit_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> HandlerResult<Document> {
    state
        .svc
        .submit_document(req.actor_id, id, req.expected_revision)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn start_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> HandlerResult<Document> {
    state
        .svc
        .start_review(req.actor_id, id, req.expected_revision)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn approve_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveRequest>,
) -> HandlerResult<Document> {
    state
        .svc
        .approve_document(req.actor_id, id, req.comment.as_deref(), req.expected_revision)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn reject_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectRequest>,
) -> HandlerResult<Document> {
    state
        .svc
        .reject_document(req.actor_id, id, &req.feedback, req.expected_revision)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn resubmit_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> HandlerResult<Document> {
    state
        .svc
        .resubmit_document(req.actor_id, id, req.expected_revision)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn archive_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> HandlerResult<Document> {
    state
        .svc
        .archive_document(req.actor_id, id, req.expected_revision)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn sign_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SignRequest>,
) -> HandlerResult<serde_json::Value> {
    let signature_type = SignatureType::parse(&req.signature_type).ok_or_else(|| {
        error_response(Error::Validation(format!(
            "unknown signature type '{}'",
            req.signature_type
        )))
    })?;
    state
        .svc
        .sign_document(
            req.actor_id,
            id,
            signature_type,
            req.comment.as_deref(),
            req.expected_revision,
        )
        .await
        .map(|sig| Json(serde_json::json!({ "signature": sig })))
        .map_err(error_response)
}

pub async fn verify_signature(
    State(state): State<AppState>,
    Path((id, signature_id)): Path<(Uuid, Uuid)>,
) -> HandlerResult<serde_json::Value> {
    state
        .svc
        .verify_signature(id, signature_id)
        .await
        .map(|valid| Json(serde_json::json!({ "valid": valid })))
        .map_err(error_response)
}

pub async fn restore_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RestoreRequest>,
) -> HandlerResult<Document> {
    state
        .svc
        .restore_version(req.actor_id, id, req.version, req.expected_revision)
        .await
        .map(Json)
        .map_err(error_response)
}
