use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use docflow_core::models::message::{
    InterDepartmentMessage, MessagePriority, MessageRecipient, MessageStats,
};
use docflow_service::messaging::MessageParams;

use crate::{error_response, AppState};

#[derive(Debug, Deserialize)]
pub struct SendDirectRequest {
    pub actor_id: Uuid,
    pub to_user: Uuid,
    #[serde(flatten)]
    pub message: MessageBody,
}

#[derive(Debug, Deserialize)]
pub struct SendBroadcastRequest {
    pub actor_id: Uuid,
    pub department: String,
    #[serde(flatten)]
    pub message: MessageBody,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub subject: String,
    pub body: String,
    pub priority: Option<MessagePriority>,
    #[serde(default)]
    pub requires_response: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub response_deadline: Option<OffsetDateTime>,
}

impl MessageBody {
    fn into_params(self) -> MessageParams {
        MessageParams {
            subject: self.subject,
            body: self.body,
            priority: self.priority.unwrap_or(MessagePriority::Normal),
            requires_response: self.requires_response,
            response_deadline: self.response_deadline,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecipientActionRequest {
    pub actor_id: Uuid,
}

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

pub async fn send_direct(
    State(state): State<AppState>,
    Json(req): Json<SendDirectRequest>,
) -> HandlerResult<InterDepartmentMessage> {
    state
        .svc
        .send_direct(req.actor_id, req.to_user, req.message.into_params())
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn send_broadcast(
    State(state): State<AppState>,
    Json(req): Json<SendBroadcastRequest>,
) -> HandlerResult<serde_json::Value> {
    state
        .svc
        .send_broadcast(req.actor_id, &req.department, req.message.into_params())
        .await
        .map(|(message, recipients)| {
            Json(serde_json::json!({ "message": message, "recipients": recipients }))
        })
        .map_err(error_response)
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecipientActionRequest>,
) -> HandlerResult<MessageRecipient> {
    state
        .svc
        .mark_read(req.actor_id, id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn acknowledge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecipientActionRequest>,
) -> HandlerResult<MessageRecipient> {
    state
        .svc
        .acknowledge(req.actor_id, id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn message_stats(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> HandlerResult<MessageStats> {
    state
        .svc
        .message_stats(user_id)
        .await
        .map(Json)
        .map_err(error_response)
}
