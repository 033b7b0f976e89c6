//! `PgStore`: the Postgres implementation of the service `Store` seam.
//! Every transition write is revision-guarded so a losing concurrent writer
//! fails with `ConcurrentModification` instead of silently overwriting.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docflow_core::models::audit::AuditEntry;
use docflow_core::models::document::Document;
use docflow_core::models::message::{InterDepartmentMessage, MessageAddress, MessageRecipient};
use docflow_core::models::submission::{DocumentSubmission, SubmissionStatus};
use docflow_core::models::user::User;
use docflow_core::{Error, Result};
use docflow_service::Store;

use crate::entities::{
    message_priority_str, priority_str, DocumentRow, MessageRow, RecipientRow, SignatureRow,
    SubmissionRow, UserRow, VersionRow,
};
use crate::error::map_sqlx;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// User provisioning sits outside the workflow proper; the CLI seeder
    /// and admin tooling call this directly.
    pub async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, department, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(user.active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("insert user", e))?;
        Ok(())
    }

    async fn load_document(&self, id: Uuid) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("fetch document", e))?
            .ok_or_else(|| Error::NotFound(format!("document {id}")))?;

        let signatures = sqlx::query_as::<_, SignatureRow>(
            "SELECT * FROM document_signatures WHERE document_id = $1 ORDER BY signed_at, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("fetch signatures", e))?;

        let versions = sqlx::query_as::<_, VersionRow>(
            "SELECT * FROM document_versions WHERE document_id = $1 ORDER BY version",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("fetch versions", e))?;

        row.into_domain(signatures, versions)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("fetch user", e))?
            .ok_or_else(|| Error::NotFound(format!("user {id}")))?
            .into_domain()
    }

    async fn users_by_department(&self, department: &str) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE department = $1 ORDER BY last_name, first_name",
        )
        .bind(department)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("fetch department users", e))?;
        rows.into_iter().map(UserRow::into_domain).collect()
    }

    async fn create_document(&self, doc: &Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents
            (id, name, doc_type, department, uploaded_by, status, version,
             assigned_to, approval_chain, chain_position, current_approver,
             is_locked, tags, priority, file_url, revision, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(doc.id)
        .bind(&doc.name)
        .bind(&doc.doc_type)
        .bind(&doc.department)
        .bind(doc.uploaded_by)
        .bind(doc.status.as_str())
        .bind(doc.version)
        .bind(&doc.assigned_to)
        .bind(&doc.approval_chain)
        .bind(doc.chain_position as i32)
        .bind(doc.current_approver)
        .bind(doc.is_locked)
        .bind(&doc.tags)
        .bind(priority_str(doc.priority))
        .bind(&doc.file_url)
        .bind(doc.revision)
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("insert document", e))?;
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Document> {
        self.load_document(id).await
    }

    async fn save_document(&self, doc: &Document, expected_revision: i32) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx("begin save", e))?;

        // The row write carries the optimistic check; losing writers touch
        // zero rows and nothing below runs.
        let updated = sqlx::query(
            r#"
            UPDATE documents SET
                name = $2, doc_type = $3, department = $4, status = $5,
                version = $6, assigned_to = $7, approval_chain = $8,
                chain_position = $9, current_approver = $10, is_locked = $11,
                tags = $12, priority = $13, file_url = $14,
                revision = revision + 1, updated_at = $15
            WHERE id = $1 AND revision = $16
            "#,
        )
        .bind(doc.id)
        .bind(&doc.name)
        .bind(&doc.doc_type)
        .bind(&doc.department)
        .bind(doc.status.as_str())
        .bind(doc.version)
        .bind(&doc.assigned_to)
        .bind(&doc.approval_chain)
        .bind(doc.chain_position as i32)
        .bind(doc.current_approver)
        .bind(doc.is_locked)
        .bind(&doc.tags)
        .bind(priority_str(doc.priority))
        .bind(&doc.file_url)
        .bind(doc.updated_at)
        .bind(expected_revision)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx("update document", e))?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM documents WHERE id = $1)")
                    .bind(doc.id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx("check document", e))?;
            return Err(if exists {
                Error::ConcurrentModification(format!("document {}", doc.id))
            } else {
                Error::NotFound(format!("document {}", doc.id))
            });
        }

        // Ledger entries are append-only; only the validity flag may move.
        for sig in &doc.signatures {
            sqlx::query(
                r#"
                INSERT INTO document_signatures
                (id, document_id, signer_id, signer_role, signature_type,
                 comment, signed_at, content_hash, valid)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO UPDATE SET valid = EXCLUDED.valid
                "#,
            )
            .bind(sig.id)
            .bind(sig.document_id)
            .bind(sig.signer_id)
            .bind(sig.signer_role.as_str())
            .bind(sig.signature_type.as_str())
            .bind(&sig.comment)
            .bind(sig.signed_at)
            .bind(&sig.content_hash)
            .bind(sig.valid)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("upsert signature", e))?;
        }

        // Snapshots are immutable once written.
        for version in &doc.versions {
            sqlx::query(
                r#"
                INSERT INTO document_versions
                (document_id, version, name, doc_type, file_url, created_by, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (document_id, version) DO NOTHING
                "#,
            )
            .bind(version.document_id)
            .bind(version.version)
            .bind(&version.name)
            .bind(&version.doc_type)
            .bind(&version.file_url)
            .bind(version.created_by)
            .bind(version.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("insert version", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx("commit save", e))?;
        Ok(())
    }

    async fn documents_signed_by(&self, signer_id: Uuid) -> Result<Vec<Document>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT DISTINCT document_id FROM document_signatures WHERE signer_id = $1",
        )
        .bind(signer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("fetch signed documents", e))?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            documents.push(self.load_document(id).await?);
        }
        Ok(documents)
    }

    async fn create_submission(&self, submission: &DocumentSubmission) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO document_submissions
            (id, document_id, from_user, to_user, submission_type, status,
             submitted_at, reviewed_at, feedback, revision)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(submission.id)
        .bind(submission.document_id)
        .bind(submission.from_user)
        .bind(submission.to_user)
        .bind(submission.submission_type.as_str())
        .bind(submission.status.as_str())
        .bind(submission.submitted_at)
        .bind(submission.reviewed_at)
        .bind(&submission.feedback)
        .bind(submission.revision)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("insert submission", e))?;
        Ok(())
    }

    async fn get_submission(&self, id: Uuid) -> Result<DocumentSubmission> {
        sqlx::query_as::<_, SubmissionRow>("SELECT * FROM document_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("fetch submission", e))?
            .ok_or_else(|| Error::NotFound(format!("submission {id}")))?
            .into_domain()
    }

    async fn update_submission_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        feedback: Option<&str>,
        reviewed_at: time::OffsetDateTime,
        expected_revision: i32,
    ) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE document_submissions
            SET status = $2, feedback = $3, reviewed_at = $4, revision = revision + 1
            WHERE id = $1 AND revision = $5 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(feedback)
        .bind(reviewed_at)
        .bind(expected_revision)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("update submission", e))?;

        if updated.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM document_submissions WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_sqlx("check submission", e))?;
            return Err(match current {
                None => Error::NotFound(format!("submission {id}")),
                Some(s) if s != "pending" => Error::AlreadyReviewed,
                Some(_) => Error::ConcurrentModification(format!("submission {id}")),
            });
        }
        Ok(())
    }

    async fn create_message(
        &self,
        message: &InterDepartmentMessage,
        recipients: &[MessageRecipient],
    ) -> Result<()> {
        let (to_user, to_department) = match &message.to {
            MessageAddress::User(id) => (Some(*id), None),
            MessageAddress::Department(d) => (None, Some(d.as_str())),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx("begin message", e))?;

        sqlx::query(
            r#"
            INSERT INTO messages
            (id, from_user, to_user, to_department, subject, body, priority,
             requires_response, response_deadline, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(message.id)
        .bind(message.from_user)
        .bind(to_user)
        .bind(to_department)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message_priority_str(message.priority))
        .bind(message.requires_response)
        .bind(message.response_deadline)
        .bind(message.sent_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx("insert message", e))?;

        for r in recipients {
            sqlx::query(
                r#"
                INSERT INTO message_recipients (message_id, user_id, state, read_at, acknowledged_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(r.message_id)
            .bind(r.user_id)
            .bind(r.state.as_str())
            .bind(r.read_at)
            .bind(r.acknowledged_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("insert recipient", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx("commit message", e))?;
        Ok(())
    }

    async fn get_message(&self, id: Uuid) -> Result<InterDepartmentMessage> {
        sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("fetch message", e))?
            .ok_or_else(|| Error::NotFound(format!("message {id}")))?
            .into_domain()
    }

    async fn get_recipient(&self, message_id: Uuid, user_id: Uuid) -> Result<MessageRecipient> {
        sqlx::query_as::<_, RecipientRow>(
            "SELECT * FROM message_recipients WHERE message_id = $1 AND user_id = $2",
        )
        .bind(message_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("fetch recipient", e))?
        .ok_or_else(|| Error::NotFound(format!("recipient {user_id} of message {message_id}")))?
        .into_domain()
    }

    async fn save_recipient(&self, recipient: &MessageRecipient) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE message_recipients
            SET state = $3, read_at = $4, acknowledged_at = $5
            WHERE message_id = $1 AND user_id = $2
            "#,
        )
        .bind(recipient.message_id)
        .bind(recipient.user_id)
        .bind(recipient.state.as_str())
        .bind(recipient.read_at)
        .bind(recipient.acknowledged_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("update recipient", e))?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "recipient {} of message {}",
                recipient.user_id, recipient.message_id
            )));
        }
        Ok(())
    }

    async fn inbox(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(InterDepartmentMessage, MessageRecipient)>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            "SELECT * FROM message_recipients WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("fetch inbox", e))?;

        let mut inbox = Vec::with_capacity(rows.len());
        for row in rows {
            let recipient = row.into_domain()?;
            let message = self.get_message(recipient.message_id).await?;
            inbox.push((message, recipient));
        }
        Ok(inbox)
    }

    async fn sent_by(&self, user_id: Uuid) -> Result<Vec<InterDepartmentMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages WHERE from_user = $1 ORDER BY sent_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("fetch sent", e))?;
        rows.into_iter().map(MessageRow::into_domain).collect()
    }

    async fn append_audit_log(&self, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, actor_id, action, target_kind, target_id, details, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.target_kind)
        .bind(entry.target_id)
        .bind(&entry.details)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("append audit", e))?;
        Ok(())
    }
}
