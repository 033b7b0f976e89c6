use serde_json::json;
use uuid::Uuid;

use docflow_core::models::document::{Document, Priority};
use docflow_core::models::signature::{verify, DigitalSignature, SignatureType};
use docflow_core::models::user::{Role, User};
use docflow_core::workflow::approval;
use docflow_core::{Error, Result};

use crate::{Store, WorkflowService};

#[derive(Debug, Clone)]
pub struct CreateDocumentParams {
    pub name: String,
    pub doc_type: String,
    pub department: String,
    pub file_url: Option<String>,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub approval_chain: Vec<Uuid>,
    pub assigned_to: Vec<Uuid>,
}

impl<S: Store> WorkflowService<S> {
    /// Resolve the acting user; deactivated accounts cannot act.
    pub(crate) async fn actor(&self, id: Uuid) -> Result<User> {
        let user = self.store.get_user(id).await?;
        if !user.active {
            return Err(Error::Unauthorized(format!("user {id} is deactivated")));
        }
        Ok(user)
    }

    /// Load a document for a mutation. When the caller sends the revision it
    /// last read, a stale token fails fast with `ConcurrentModification`
    /// before any rule runs; the revision-checked save catches the rest.
    async fn document_for_update(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        expected_revision: Option<i32>,
    ) -> Result<(Document, User, i32)> {
        let actor = self.actor(actor_id).await?;
        let doc = self.store.get_document(document_id).await?;
        let base_revision = doc.revision;
        if let Some(expected) = expected_revision {
            if expected != base_revision {
                return Err(Error::ConcurrentModification(format!("document {document_id}")));
            }
        }
        Ok((doc, actor, base_revision))
    }

    /// Save with the revision check, then reflect the bump on the returned
    /// aggregate so callers can keep chaining optimistic tokens.
    async fn persist(&self, doc: &mut Document, base_revision: i32) -> Result<()> {
        self.store.save_document(doc, base_revision).await?;
        doc.revision = base_revision + 1;
        Ok(())
    }

    pub async fn create_document(
        &self,
        actor_id: Uuid,
        params: CreateDocumentParams,
    ) -> Result<Document> {
        let actor = self.actor(actor_id).await?;
        let now = self.now();

        let mut doc = Document::new(params.name, params.doc_type, params.department, actor.id, now);
        doc.file_url = params.file_url;
        doc.tags = params.tags;
        doc.priority = params.priority;
        doc.approval_chain = params.approval_chain;
        doc.assigned_to = params.assigned_to;

        self.store.create_document(&doc).await?;
        self.record_audit(
            actor.id,
            "document.create",
            "document",
            doc.id,
            json!({ "name": doc.name, "department": doc.department }),
        )
        .await;
        Ok(doc)
    }

    pub async fn get_document(&self, id: Uuid) -> Result<Document> {
        self.store.get_document(id).await
    }

    pub async fn submit_document(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        expected_revision: Option<i32>,
    ) -> Result<Document> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        approval::submit(&mut doc, &actor, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(
            actor.id,
            "document.submit",
            "document",
            doc.id,
            json!({ "version": doc.version, "current_approver": doc.current_approver }),
        )
        .await;
        Ok(doc)
    }

    pub async fn start_review(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        expected_revision: Option<i32>,
    ) -> Result<Document> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        approval::start_review(&mut doc, &actor, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(
            actor.id,
            "document.start_review",
            "document",
            doc.id,
            json!({ "chain_position": doc.chain_position }),
        )
        .await;
        Ok(doc)
    }

    pub async fn approve_document(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        comment: Option<&str>,
        expected_revision: Option<i32>,
    ) -> Result<Document> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        let sig = approval::approve(&mut doc, &actor, comment, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(
            actor.id,
            "document.approve",
            "document",
            doc.id,
            json!({ "signature": sig.id, "locked": doc.is_locked, "status": doc.status.as_str() }),
        )
        .await;
        Ok(doc)
    }

    pub async fn reject_document(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        feedback: &str,
        expected_revision: Option<i32>,
    ) -> Result<Document> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        let sig = approval::reject(&mut doc, &actor, feedback, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(
            actor.id,
            "document.reject",
            "document",
            doc.id,
            json!({ "signature": sig.id, "feedback": feedback }),
        )
        .await;
        Ok(doc)
    }

    pub async fn resubmit_document(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        expected_revision: Option<i32>,
    ) -> Result<Document> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        approval::resubmit(&mut doc, &actor, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(
            actor.id,
            "document.resubmit",
            "document",
            doc.id,
            json!({ "version": doc.version }),
        )
        .await;
        Ok(doc)
    }

    pub async fn archive_document(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        expected_revision: Option<i32>,
    ) -> Result<Document> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        approval::archive(&mut doc, &actor, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(actor.id, "document.archive", "document", doc.id, json!({}))
            .await;
        Ok(doc)
    }

    /// Ledger entry point: routes approval/rejection signatures through the
    /// state machine, appends acknowledgments as audit-only signatures.
    pub async fn sign_document(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        signature_type: SignatureType,
        comment: Option<&str>,
        expected_revision: Option<i32>,
    ) -> Result<DigitalSignature> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        let sig = approval::sign(&mut doc, &actor, signature_type, comment, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(
            actor.id,
            "document.sign",
            "document",
            doc.id,
            json!({ "type": signature_type.as_str(), "signature": sig.id }),
        )
        .await;
        Ok(sig)
    }

    /// Pure re-validation of a stored signature. Never mutates.
    pub async fn verify_signature(&self, document_id: Uuid, signature_id: Uuid) -> Result<bool> {
        let doc = self.store.get_document(document_id).await?;
        let sig = doc
            .signatures
            .iter()
            .find(|s| s.id == signature_id)
            .ok_or_else(|| Error::NotFound(format!("signature {signature_id}")))?;
        Ok(verify(sig, &doc))
    }

    /// Owner (or admin) copies an old snapshot's content back onto the
    /// working document.
    pub async fn restore_version(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        version: i32,
        expected_revision: Option<i32>,
    ) -> Result<Document> {
        let (mut doc, actor, base) = self
            .document_for_update(actor_id, document_id, expected_revision)
            .await?;
        if !doc.is_owner(actor.id) && !matches!(actor.role, Role::Admin | Role::SuperAdmin) {
            return Err(Error::Unauthorized(
                "only the owner or an admin may restore versions".to_string(),
            ));
        }
        doc.restore_version(version, actor.id, self.now())?;
        self.persist(&mut doc, base).await?;
        self.record_audit(
            actor.id,
            "document.restore_version",
            "document",
            doc.id,
            json!({ "restored": version, "version": doc.version }),
        )
        .await;
        Ok(doc)
    }

    /// Deactivation hook: a signer leaving the hospital invalidates their
    /// signatures going forward. Documents they signed keep their status.
    pub async fn invalidate_signatures_for(
        &self,
        actor_id: Uuid,
        signer_id: Uuid,
    ) -> Result<usize> {
        let actor = self.actor(actor_id).await?;
        if !matches!(actor.role, Role::Admin | Role::SuperAdmin) {
            return Err(Error::Unauthorized(
                "only admins may invalidate signatures".to_string(),
            ));
        }

        let mut invalidated = 0;
        for mut doc in self.store.documents_signed_by(signer_id).await? {
            let base = doc.revision;
            let mut touched = false;
            for sig in &mut doc.signatures {
                if sig.signer_id == signer_id && sig.valid {
                    sig.valid = false;
                    touched = true;
                    invalidated += 1;
                }
            }
            if touched {
                doc.updated_at = self.now();
                self.persist(&mut doc, base).await?;
            }
        }
        self.record_audit(
            actor.id,
            "signature.invalidate_signer",
            "user",
            signer_id,
            json!({ "invalidated": invalidated }),
        )
        .await;
        Ok(invalidated)
    }
}
