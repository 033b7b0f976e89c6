use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::signature::DigitalSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Submitted => "submitted",
            DocumentStatus::UnderReview => "under_review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<DocumentStatus> {
        Some(match value {
            "draft" => DocumentStatus::Draft,
            "submitted" => DocumentStatus::Submitted,
            "under_review" => DocumentStatus::UnderReview,
            "approved" => DocumentStatus::Approved,
            "rejected" => DocumentStatus::Rejected,
            "archived" => DocumentStatus::Archived,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Immutable snapshot of a document's content at a given content version.
/// Append-only; restoring copies the content back onto the working document
/// under a fresh version number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub document_id: Uuid,
    pub version: i32,
    pub name: String,
    pub doc_type: String,
    pub file_url: Option<String>,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The document aggregate the workflow operates on.
///
/// `version` is the user-visible content version and only moves on
/// resubmission or version restore. `revision` is the storage row revision
/// used for optimistic concurrency and bumps on every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub doc_type: String,
    pub department: String,
    pub uploaded_by: Uuid,
    pub status: DocumentStatus,
    pub version: i32,
    pub assigned_to: Vec<Uuid>,
    pub approval_chain: Vec<Uuid>,
    /// Index into `approval_chain` of the approver currently responsible.
    pub chain_position: usize,
    pub current_approver: Option<Uuid>,
    pub is_locked: bool,
    pub signatures: Vec<DigitalSignature>,
    pub versions: Vec<DocumentVersion>,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub file_url: Option<String>,
    pub revision: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        doc_type: impl Into<String>,
        department: impl Into<String>,
        uploaded_by: Uuid,
        now: OffsetDateTime,
    ) -> Self {
        Document {
            id: Uuid::new_v4(),
            name: name.into(),
            doc_type: doc_type.into(),
            department: department.into(),
            uploaded_by,
            status: DocumentStatus::Draft,
            version: 1,
            assigned_to: Vec::new(),
            approval_chain: Vec::new(),
            chain_position: 0,
            current_approver: None,
            is_locked: false,
            signatures: Vec::new(),
            versions: Vec::new(),
            tags: Vec::new(),
            priority: Priority::Medium,
            file_url: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.uploaded_by == user_id
    }

    pub fn is_current_approver(&self, user_id: Uuid) -> bool {
        self.current_approver == Some(user_id)
    }

    /// Whether the chain pointer sits on the last approver.
    pub fn at_final_chain_step(&self) -> bool {
        self.chain_position + 1 >= self.approval_chain.len()
    }

    /// Snapshot the current content into the version history.
    pub fn snapshot(&mut self, created_by: Uuid, now: OffsetDateTime) {
        let snap = DocumentVersion {
            document_id: self.id,
            version: self.version,
            name: self.name.clone(),
            doc_type: self.doc_type.clone(),
            file_url: self.file_url.clone(),
            created_by,
            created_at: now,
        };
        self.versions.push(snap);
    }

    pub fn find_version(&self, version: i32) -> Option<&DocumentVersion> {
        self.versions.iter().find(|v| v.version == version)
    }

    /// Copy a snapshot's content back onto the working document. The restore
    /// itself is a content change: it snapshots the outgoing state and bumps
    /// the content version, so history is never rewritten.
    pub fn restore_version(
        &mut self,
        version: i32,
        restored_by: Uuid,
        now: OffsetDateTime,
    ) -> Result<()> {
        if self.is_locked {
            return Err(Error::DocumentLocked);
        }
        let snap = self
            .find_version(version)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("version {version} of document {}", self.id)))?;

        self.snapshot(restored_by, now);
        self.name = snap.name;
        self.doc_type = snap.doc_type;
        self.file_url = snap.file_url;
        self.version += 1;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn doc() -> Document {
        Document::new(
            "Theatre Protocol",
            "policy",
            "Surgery",
            Uuid::new_v4(),
            datetime!(2026-03-01 09:00 UTC),
        )
    }

    #[test]
    fn snapshot_then_restore_round_trips_content() {
        let owner = Uuid::new_v4();
        let now = datetime!(2026-03-02 10:00 UTC);
        let mut d = doc();
        d.file_url = Some("files/v1.pdf".to_string());
        d.snapshot(owner, now);

        // Mutate content, then restore the snapshot.
        d.name = "Theatre Protocol (rev)".to_string();
        d.file_url = Some("files/v2.pdf".to_string());
        d.version = 2;

        d.restore_version(1, owner, now).unwrap();
        assert_eq!(d.name, "Theatre Protocol");
        assert_eq!(d.file_url.as_deref(), Some("files/v1.pdf"));
        assert_eq!(d.version, 3);
        // The pre-restore state is itself preserved as a snapshot.
        assert_eq!(d.find_version(2).unwrap().file_url.as_deref(), Some("files/v2.pdf"));
    }

    #[test]
    fn restore_missing_version_is_not_found() {
        let mut d = doc();
        let err = d
            .restore_version(9, d.uploaded_by, datetime!(2026-03-02 10:00 UTC))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn restore_on_locked_document_is_refused() {
        let mut d = doc();
        d.snapshot(d.uploaded_by, datetime!(2026-03-02 10:00 UTC));
        d.is_locked = true;
        let err = d
            .restore_version(1, d.uploaded_by, datetime!(2026-03-02 11:00 UTC))
            .unwrap_err();
        assert_eq!(err, Error::DocumentLocked);
    }
}
