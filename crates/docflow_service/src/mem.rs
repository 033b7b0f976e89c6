//! In-memory `Store` used by the service test-suite and for local bring-up
//! without a database. Mirrors the Postgres implementation's concurrency
//! contract: revision-checked writes, at-most-one transition wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use docflow_core::models::audit::AuditEntry;
use docflow_core::models::document::Document;
use docflow_core::models::message::{InterDepartmentMessage, MessageRecipient};
use docflow_core::models::submission::{DocumentSubmission, SubmissionStatus};
use docflow_core::models::user::User;
use docflow_core::{Error, Result};

use crate::store::Store;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    documents: HashMap<Uuid, Document>,
    submissions: HashMap<Uuid, DocumentSubmission>,
    messages: HashMap<Uuid, InterDepartmentMessage>,
    recipients: HashMap<(Uuid, Uuid), MessageRecipient>,
    audit_log: Vec<AuditEntry>,
}

#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.inner.lock().unwrap().users.insert(user.id, user);
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.inner.lock().unwrap().audit_log.clone()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn get_user(&self, id: Uuid) -> Result<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }

    async fn users_by_department(&self, department: &str) -> Result<Vec<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| u.department == department)
            .cloned()
            .collect())
    }

    async fn create_document(&self, doc: &Document) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Document> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("document {id}")))
    }

    async fn save_document(&self, doc: &Document, expected_revision: i32) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .documents
            .get_mut(&doc.id)
            .ok_or_else(|| Error::NotFound(format!("document {}", doc.id)))?;
        if stored.revision != expected_revision {
            return Err(Error::ConcurrentModification(format!("document {}", doc.id)));
        }
        let mut updated = doc.clone();
        updated.revision = expected_revision + 1;
        *stored = updated;
        Ok(())
    }

    async fn documents_signed_by(&self, signer_id: Uuid) -> Result<Vec<Document>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .documents
            .values()
            .filter(|d| d.signatures.iter().any(|s| s.signer_id == signer_id))
            .cloned()
            .collect())
    }

    async fn create_submission(&self, submission: &DocumentSubmission) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .submissions
            .insert(submission.id, submission.clone());
        Ok(())
    }

    async fn get_submission(&self, id: Uuid) -> Result<DocumentSubmission> {
        self.inner
            .lock()
            .unwrap()
            .submissions
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("submission {id}")))
    }

    async fn update_submission_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        feedback: Option<&str>,
        reviewed_at: time::OffsetDateTime,
        expected_revision: i32,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .submissions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("submission {id}")))?;
        if !stored.is_pending() {
            return Err(Error::AlreadyReviewed);
        }
        if stored.revision != expected_revision {
            return Err(Error::ConcurrentModification(format!("submission {id}")));
        }
        stored.status = status;
        stored.feedback = feedback.map(str::to_string);
        stored.reviewed_at = Some(reviewed_at);
        stored.revision += 1;
        Ok(())
    }

    async fn create_message(
        &self,
        message: &InterDepartmentMessage,
        recipients: &[MessageRecipient],
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.messages.insert(message.id, message.clone());
        for r in recipients {
            inner.recipients.insert((r.message_id, r.user_id), r.clone());
        }
        Ok(())
    }

    async fn get_message(&self, id: Uuid) -> Result<InterDepartmentMessage> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("message {id}")))
    }

    async fn get_recipient(&self, message_id: Uuid, user_id: Uuid) -> Result<MessageRecipient> {
        self.inner
            .lock()
            .unwrap()
            .recipients
            .get(&(message_id, user_id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("recipient {user_id} of message {message_id}")))
    }

    async fn save_recipient(&self, recipient: &MessageRecipient) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (recipient.message_id, recipient.user_id);
        if !inner.recipients.contains_key(&key) {
            return Err(Error::NotFound(format!(
                "recipient {} of message {}",
                recipient.user_id, recipient.message_id
            )));
        }
        inner.recipients.insert(key, recipient.clone());
        Ok(())
    }

    async fn inbox(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(InterDepartmentMessage, MessageRecipient)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .recipients
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                inner
                    .messages
                    .get(&r.message_id)
                    .map(|m| (m.clone(), r.clone()))
            })
            .collect())
    }

    async fn sent_by(&self, user_id: Uuid) -> Result<Vec<InterDepartmentMessage>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .messages
            .values()
            .filter(|m| m.from_user == user_id)
            .cloned()
            .collect())
    }

    async fn append_audit_log(&self, entry: &AuditEntry) -> Result<()> {
        self.inner.lock().unwrap().audit_log.push(entry.clone());
        Ok(())
    }
}
