//! Row types and their translation to the domain aggregates. Enums are
//! stored as text columns; translation failures surface as `Database`
//! errors rather than panics.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use docflow_core::models::document::{Document, DocumentStatus, DocumentVersion, Priority};
use docflow_core::models::message::{
    DeliveryState, InterDepartmentMessage, MessageAddress, MessagePriority, MessageRecipient,
};
use docflow_core::models::signature::{DigitalSignature, SignatureType};
use docflow_core::models::submission::{DocumentSubmission, SubmissionStatus, SubmissionType};
use docflow_core::models::user::{Role, User};
use docflow_core::{Error, Result};

use crate::error::corrupt;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub department: String,
    pub active: bool,
}

impl UserRow {
    pub fn into_domain(self) -> Result<User> {
        let role = Role::parse(&self.role).ok_or_else(|| corrupt("user.role", &self.role))?;
        Ok(User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            department: self.department,
            active: self.active,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub name: String,
    pub doc_type: String,
    pub department: String,
    pub uploaded_by: Uuid,
    pub status: String,
    pub version: i32,
    pub assigned_to: Vec<Uuid>,
    pub approval_chain: Vec<Uuid>,
    pub chain_position: i32,
    pub current_approver: Option<Uuid>,
    pub is_locked: bool,
    pub tags: Vec<String>,
    pub priority: String,
    pub file_url: Option<String>,
    pub revision: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl DocumentRow {
    pub fn into_domain(
        self,
        signatures: Vec<SignatureRow>,
        versions: Vec<VersionRow>,
    ) -> Result<Document> {
        let status = DocumentStatus::parse(&self.status)
            .ok_or_else(|| corrupt("document.status", &self.status))?;
        let priority = parse_priority(&self.priority)?;
        Ok(Document {
            id: self.id,
            name: self.name,
            doc_type: self.doc_type,
            department: self.department,
            uploaded_by: self.uploaded_by,
            status,
            version: self.version,
            assigned_to: self.assigned_to,
            approval_chain: self.approval_chain,
            chain_position: self.chain_position as usize,
            current_approver: self.current_approver,
            is_locked: self.is_locked,
            signatures: signatures
                .into_iter()
                .map(SignatureRow::into_domain)
                .collect::<Result<_>>()?,
            versions: versions.into_iter().map(VersionRow::into_domain).collect(),
            tags: self.tags,
            priority,
            file_url: self.file_url,
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SignatureRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub signer_id: Uuid,
    pub signer_role: String,
    pub signature_type: String,
    pub comment: Option<String>,
    pub signed_at: OffsetDateTime,
    pub content_hash: String,
    pub valid: bool,
}

impl SignatureRow {
    pub fn into_domain(self) -> Result<DigitalSignature> {
        let signer_role = Role::parse(&self.signer_role)
            .ok_or_else(|| corrupt("signature.signer_role", &self.signer_role))?;
        let signature_type = SignatureType::parse(&self.signature_type)
            .ok_or_else(|| corrupt("signature.type", &self.signature_type))?;
        Ok(DigitalSignature {
            id: self.id,
            document_id: self.document_id,
            signer_id: self.signer_id,
            signer_role,
            signature_type,
            comment: self.comment,
            signed_at: self.signed_at,
            content_hash: self.content_hash,
            valid: self.valid,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct VersionRow {
    pub document_id: Uuid,
    pub version: i32,
    pub name: String,
    pub doc_type: String,
    pub file_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
}

impl VersionRow {
    pub fn into_domain(self) -> DocumentVersion {
        DocumentVersion {
            document_id: self.document_id,
            version: self.version,
            name: self.name,
            doc_type: self.doc_type,
            file_url: self.file_url,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub submission_type: String,
    pub status: String,
    pub submitted_at: OffsetDateTime,
    pub reviewed_at: Option<OffsetDateTime>,
    pub feedback: Option<String>,
    pub revision: i32,
}

impl SubmissionRow {
    pub fn into_domain(self) -> Result<DocumentSubmission> {
        let submission_type = SubmissionType::parse(&self.submission_type)
            .ok_or_else(|| corrupt("submission.type", &self.submission_type))?;
        let status = SubmissionStatus::parse(&self.status)
            .ok_or_else(|| corrupt("submission.status", &self.status))?;
        Ok(DocumentSubmission {
            id: self.id,
            document_id: self.document_id,
            from_user: self.from_user,
            to_user: self.to_user,
            submission_type,
            status,
            submitted_at: self.submitted_at,
            reviewed_at: self.reviewed_at,
            feedback: self.feedback,
            revision: self.revision,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Option<Uuid>,
    pub to_department: Option<String>,
    pub subject: String,
    pub body: String,
    pub priority: String,
    pub requires_response: bool,
    pub response_deadline: Option<OffsetDateTime>,
    pub sent_at: OffsetDateTime,
}

impl MessageRow {
    pub fn into_domain(self) -> Result<InterDepartmentMessage> {
        let to = match (self.to_user, self.to_department) {
            (Some(user), None) => MessageAddress::User(user),
            (None, Some(department)) => MessageAddress::Department(department),
            _ => {
                return Err(Error::Database(format!(
                    "message {} must address exactly one of user or department",
                    self.id
                )))
            }
        };
        let priority = parse_message_priority(&self.priority)?;
        Ok(InterDepartmentMessage {
            id: self.id,
            from_user: self.from_user,
            to,
            subject: self.subject,
            body: self.body,
            priority,
            requires_response: self.requires_response,
            response_deadline: self.response_deadline,
            sent_at: self.sent_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct RecipientRow {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub state: String,
    pub read_at: Option<OffsetDateTime>,
    pub acknowledged_at: Option<OffsetDateTime>,
}

impl RecipientRow {
    pub fn into_domain(self) -> Result<MessageRecipient> {
        let state = DeliveryState::parse(&self.state)
            .ok_or_else(|| corrupt("recipient.state", &self.state))?;
        Ok(MessageRecipient {
            message_id: self.message_id,
            user_id: self.user_id,
            state,
            read_at: self.read_at,
            acknowledged_at: self.acknowledged_at,
        })
    }
}

pub fn priority_str(p: Priority) -> &'static str {
    match p {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
        Priority::Urgent => "urgent",
    }
}

fn parse_priority(value: &str) -> Result<Priority> {
    Ok(match value {
        "low" => Priority::Low,
        "medium" => Priority::Medium,
        "high" => Priority::High,
        "urgent" => Priority::Urgent,
        other => return Err(corrupt("document.priority", other)),
    })
}

pub fn message_priority_str(p: MessagePriority) -> &'static str {
    match p {
        MessagePriority::Low => "low",
        MessagePriority::Normal => "normal",
        MessagePriority::High => "high",
        MessagePriority::Urgent => "urgent",
    }
}

fn parse_message_priority(value: &str) -> Result<MessagePriority> {
    Ok(match value {
        "low" => MessagePriority::Low,
        "normal" => MessagePriority::Normal,
        "high" => MessagePriority::High,
        "urgent" => MessagePriority::Urgent,
        other => return Err(corrupt("message.priority", other)),
    })
}
