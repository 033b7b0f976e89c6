use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::document::Document;
use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureType {
    Approval,
    Rejection,
    Acknowledgment,
}

impl SignatureType {
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureType::Approval => "approval",
            SignatureType::Rejection => "rejection",
            SignatureType::Acknowledgment => "acknowledgment",
        }
    }

    pub fn parse(value: &str) -> Option<SignatureType> {
        Some(match value {
            "approval" => SignatureType::Approval,
            "rejection" => SignatureType::Rejection,
            "acknowledgment" => SignatureType::Acknowledgment,
            _ => return None,
        })
    }
}

/// One entry in a document's signature ledger. Append-only: signatures are
/// never deleted, only flagged invalid (signer deactivated, or a rejection
/// superseded by a resubmission).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSignature {
    pub id: Uuid,
    pub document_id: Uuid,
    pub signer_id: Uuid,
    pub signer_role: Role,
    pub signature_type: SignatureType,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub signed_at: OffsetDateTime,
    /// SHA-256 over the signed document coordinates, hex encoded.
    pub content_hash: String,
    pub valid: bool,
}

/// Hash binding a signature to what was signed: the document identity, its
/// content version and file reference, the signer, and the server-assigned
/// timestamp. Recomputable from stored state alone.
pub fn content_hash(doc: &Document, signer_id: Uuid, signed_at: OffsetDateTime) -> String {
    let mut hasher = Sha256::new();
    hasher.update(doc.id.as_bytes());
    hasher.update(doc.version.to_be_bytes());
    hasher.update(doc.file_url.as_deref().unwrap_or("").as_bytes());
    hasher.update(signer_id.as_bytes());
    hasher.update(signed_at.unix_timestamp().to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Re-validate a stored signature against the document it claims to sign.
/// Pure: never mutates. A signature invalidated by signer deactivation stays
/// invalid even if the hash still matches.
pub fn verify(sig: &DigitalSignature, doc: &Document) -> bool {
    if !sig.valid || sig.document_id != doc.id {
        return false;
    }
    // The hash was computed against the content version current at signing
    // time; a later resubmission changes doc.version and the recomputation
    // must use the signed snapshot if one exists.
    let recomputed = if doc.version == signed_version(sig, doc) {
        content_hash(doc, sig.signer_id, sig.signed_at)
    } else {
        match doc.find_version(signed_version(sig, doc)) {
            Some(snap) => {
                let mut hasher = Sha256::new();
                hasher.update(doc.id.as_bytes());
                hasher.update(snap.version.to_be_bytes());
                hasher.update(snap.file_url.as_deref().unwrap_or("").as_bytes());
                hasher.update(sig.signer_id.as_bytes());
                hasher.update(sig.signed_at.unix_timestamp().to_be_bytes());
                hex::encode(hasher.finalize())
            }
            None => return false,
        }
    };
    recomputed == sig.content_hash
}

// A ledger entry does not store the version explicitly; it is recovered from
// the newest snapshot at or before the signing time, falling back to the
// working version.
fn signed_version(sig: &DigitalSignature, doc: &Document) -> i32 {
    doc.versions
        .iter()
        .filter(|v| v.created_at >= sig.signed_at)
        .map(|v| v.version)
        .min()
        .unwrap_or(doc.version)
}
