//! The document approval state machine.
//!
//! `Draft → Submitted → UnderReview → {Approved | Rejected} → Archived`,
//! with `Rejected → Draft` on resubmission. These functions are the only
//! code allowed to change `Document::status` and `Document::is_locked`;
//! everything here is pure against the in-memory aggregate, persistence is
//! the caller's problem.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::document::{Document, DocumentStatus};
use crate::models::signature::{content_hash, DigitalSignature, SignatureType};
use crate::models::user::{Role, User};
use crate::workflow::policy::{authorize, ensure_unlocked, DocumentAction};

/// `Draft → Submitted`. Owner only; requires department, type, and a
/// non-empty approval chain. Points the chain at its first approver.
pub fn submit(doc: &mut Document, actor: &User, now: OffsetDateTime) -> Result<()> {
    authorize(DocumentAction::Submit, doc, actor)?;
    ensure_unlocked(doc, actor)?;

    if doc.department.trim().is_empty() {
        return Err(Error::Validation("document department is required".to_string()));
    }
    if doc.doc_type.trim().is_empty() {
        return Err(Error::Validation("document type is required".to_string()));
    }
    if doc.approval_chain.is_empty() {
        return Err(Error::Validation("approval chain is empty".to_string()));
    }

    doc.chain_position = 0;
    doc.current_approver = Some(doc.approval_chain[0]);
    doc.status = DocumentStatus::Submitted;
    doc.updated_at = now;
    Ok(())
}

/// `Submitted → UnderReview` by the designated current approver (CMD and
/// SUPER_ADMIN may step in on any document).
pub fn start_review(doc: &mut Document, actor: &User, now: OffsetDateTime) -> Result<()> {
    authorize(DocumentAction::StartReview, doc, actor)?;
    ensure_unlocked(doc, actor)?;

    doc.status = DocumentStatus::UnderReview;
    doc.updated_at = now;
    Ok(())
}

/// `UnderReview → Approved` at the final chain step; an approval at an
/// earlier step appends the approver's signature and hands the document to
/// the next approver in the chain (back to `Submitted` in their queue).
/// Approval at the final step writes the locking signature.
pub fn approve(
    doc: &mut Document,
    actor: &User,
    comment: Option<&str>,
    now: OffsetDateTime,
) -> Result<DigitalSignature> {
    guard_locked_signing(doc, actor, SignatureType::Approval)?;
    authorize(DocumentAction::Approve, doc, actor)?;
    let sig = append_signature(doc, actor, SignatureType::Approval, comment, now);

    if doc.at_final_chain_step() {
        doc.status = DocumentStatus::Approved;
        doc.is_locked = true;
    } else {
        doc.chain_position += 1;
        doc.current_approver = Some(doc.approval_chain[doc.chain_position]);
        doc.status = DocumentStatus::Submitted;
    }
    doc.updated_at = now;
    Ok(sig)
}

/// `UnderReview → Rejected`. Requires non-empty feedback; never locks, so
/// the owner can resubmit.
pub fn reject(
    doc: &mut Document,
    actor: &User,
    feedback: &str,
    now: OffsetDateTime,
) -> Result<DigitalSignature> {
    guard_locked_signing(doc, actor, SignatureType::Rejection)?;
    authorize(DocumentAction::Reject, doc, actor)?;
    if feedback.trim().is_empty() {
        return Err(Error::Validation("rejection feedback is required".to_string()));
    }
    let sig = append_signature(doc, actor, SignatureType::Rejection, Some(feedback), now);

    doc.status = DocumentStatus::Rejected;
    doc.updated_at = now;
    Ok(sig)
}

/// `Rejected → Draft`. Owner resubmission: snapshots the rejected content,
/// bumps the content version, resets chain progress, and supersedes the
/// rejection signatures so the same reviewers can sign the new version.
/// Version history and the signature ledger are preserved.
pub fn resubmit(doc: &mut Document, actor: &User, now: OffsetDateTime) -> Result<()> {
    authorize(DocumentAction::Resubmit, doc, actor)?;
    ensure_unlocked(doc, actor)?;

    doc.snapshot(actor.id, now);
    doc.version += 1;
    doc.chain_position = 0;
    doc.current_approver = None;
    for sig in &mut doc.signatures {
        if sig.signature_type == SignatureType::Rejection {
            sig.valid = false;
        }
    }
    doc.status = DocumentStatus::Draft;
    doc.updated_at = now;
    Ok(())
}

/// Terminal state → `Archived`, admin action only. Archiving an approved
/// (locked) document is still a status change on a locked row, so only
/// SUPER_ADMIN clears the lock guard.
pub fn archive(doc: &mut Document, actor: &User, now: OffsetDateTime) -> Result<()> {
    authorize(DocumentAction::Archive, doc, actor)?;
    ensure_unlocked(doc, actor)?;

    doc.status = DocumentStatus::Archived;
    doc.updated_at = now;
    Ok(())
}

/// The signature ledger entry point. Approval and rejection signatures are
/// status transitions and run through the state machine above;
/// acknowledgment signatures append to the ledger without touching status,
/// locked or not.
pub fn sign(
    doc: &mut Document,
    signer: &User,
    signature_type: SignatureType,
    comment: Option<&str>,
    now: OffsetDateTime,
) -> Result<DigitalSignature> {
    match signature_type {
        SignatureType::Approval => approve(doc, signer, comment, now),
        SignatureType::Rejection => {
            let feedback = comment.unwrap_or("");
            reject(doc, signer, feedback, now)
        }
        SignatureType::Acknowledgment => {
            // Audit-only: allowed on locked documents, but still append-once
            // per signer while locked.
            if doc.is_locked
                && effective_signature(doc, signer.id, SignatureType::Acknowledgment).is_some()
            {
                return Err(Error::AlreadySigned(
                    SignatureType::Acknowledgment.as_str().to_string(),
                ));
            }
            Ok(append_signature(doc, signer, SignatureType::Acknowledgment, comment, now))
        }
    }
}

/// Lock guard for ledger writes, checked before any status rule so a locked
/// document reports its real condition: the signer's own repeat attempt is
/// `AlreadySigned`, anyone else (bar SUPER_ADMIN) gets `DocumentLocked`.
fn guard_locked_signing(
    doc: &Document,
    actor: &User,
    signature_type: SignatureType,
) -> Result<()> {
    if doc.is_locked {
        if effective_signature(doc, actor.id, signature_type).is_some() {
            return Err(Error::AlreadySigned(signature_type.as_str().to_string()));
        }
        if actor.role != Role::SuperAdmin {
            return Err(Error::DocumentLocked);
        }
    }
    Ok(())
}

/// The only effective approval or rejection signature a signer holds on a
/// document; superseded and revoked entries don't count.
pub fn effective_signature(
    doc: &Document,
    signer_id: Uuid,
    signature_type: SignatureType,
) -> Option<&DigitalSignature> {
    doc.signatures
        .iter()
        .find(|s| s.valid && s.signer_id == signer_id && s.signature_type == signature_type)
}

fn append_signature(
    doc: &mut Document,
    signer: &User,
    signature_type: SignatureType,
    comment: Option<&str>,
    now: OffsetDateTime,
) -> DigitalSignature {
    let sig = DigitalSignature {
        id: Uuid::new_v4(),
        document_id: doc.id,
        signer_id: signer.id,
        signer_role: signer.role,
        signature_type,
        comment: comment.map(str::to_string),
        signed_at: now,
        content_hash: content_hash(doc, signer.id, now),
        valid: true,
    };
    doc.signatures.push(sig.clone());
    sig
}
