//! The narrow persistence seam the workflow consumes. All mutating calls
//! carry an optimistic-concurrency token; implementations must guarantee
//! at-most-one effective transition per entity and fail a losing writer
//! with `ConcurrentModification`.

use async_trait::async_trait;
use uuid::Uuid;

use docflow_core::models::audit::AuditEntry;
use docflow_core::models::document::Document;
use docflow_core::models::message::{InterDepartmentMessage, MessageRecipient};
use docflow_core::models::submission::{DocumentSubmission, SubmissionStatus};
use docflow_core::models::user::User;
use docflow_core::Result;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<User>;
    async fn users_by_department(&self, department: &str) -> Result<Vec<User>>;

    async fn create_document(&self, doc: &Document) -> Result<()>;
    async fn get_document(&self, id: Uuid) -> Result<Document>;
    /// Persist the aggregate (row, signatures, version snapshots) if and
    /// only if the stored row revision still equals `expected_revision`.
    async fn save_document(&self, doc: &Document, expected_revision: i32) -> Result<()>;
    /// Documents carrying at least one signature by the given signer.
    async fn documents_signed_by(&self, signer_id: Uuid) -> Result<Vec<Document>>;

    async fn create_submission(&self, submission: &DocumentSubmission) -> Result<()>;
    async fn get_submission(&self, id: Uuid) -> Result<DocumentSubmission>;
    async fn update_submission_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        feedback: Option<&str>,
        reviewed_at: time::OffsetDateTime,
        expected_revision: i32,
    ) -> Result<()>;

    async fn create_message(
        &self,
        message: &InterDepartmentMessage,
        recipients: &[MessageRecipient],
    ) -> Result<()>;
    async fn get_message(&self, id: Uuid) -> Result<InterDepartmentMessage>;
    async fn get_recipient(&self, message_id: Uuid, user_id: Uuid) -> Result<MessageRecipient>;
    async fn save_recipient(&self, recipient: &MessageRecipient) -> Result<()>;
    /// Messages addressed to the user, with their per-recipient state.
    async fn inbox(&self, user_id: Uuid)
        -> Result<Vec<(InterDepartmentMessage, MessageRecipient)>>;
    async fn sent_by(&self, user_id: Uuid) -> Result<Vec<InterDepartmentMessage>>;

    /// Append-only; callers treat failures as non-fatal.
    async fn append_audit_log(&self, entry: &AuditEntry) -> Result<()>;
}
