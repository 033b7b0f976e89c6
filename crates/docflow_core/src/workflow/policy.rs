use crate::error::{Error, Result};
use crate::models::document::{Document, DocumentStatus};
use crate::models::user::{Role, User};

/// Everything an actor can do to a document through the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    Submit,
    StartReview,
    Approve,
    Reject,
    Resubmit,
    Archive,
}

impl DocumentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentAction::Submit => "document.submit",
            DocumentAction::StartReview => "document.start_review",
            DocumentAction::Approve => "document.approve",
            DocumentAction::Reject => "document.reject",
            DocumentAction::Resubmit => "document.resubmit",
            DocumentAction::Archive => "document.archive",
        }
    }
}

/// Who may perform an action, stated relative to the document.
#[derive(Debug, Clone, Copy)]
pub enum ActorRule {
    /// The uploader of the document.
    Owner,
    /// The designated current approver, holding one of the given roles.
    /// CMD and SUPER_ADMIN satisfy the designation on any document.
    CurrentApprover { roles: &'static [Role] },
    /// Any user holding one of the given roles.
    AnyOf(&'static [Role]),
}

pub struct PolicyRule {
    pub action: DocumentAction,
    pub from: &'static [DocumentStatus],
    pub actor: ActorRule,
}

const APPROVER_ROLES: &[Role] = &[Role::Hod, Role::Cmd, Role::Admin, Role::SuperAdmin];

/// The single source of truth for document authorization, keyed by
/// (action, document status, actor). Guards that used to be scattered
/// per-screen live here and nowhere else.
pub const POLICY: &[PolicyRule] = &[
    PolicyRule {
        action: DocumentAction::Submit,
        from: &[DocumentStatus::Draft],
        actor: ActorRule::Owner,
    },
    PolicyRule {
        action: DocumentAction::StartReview,
        from: &[DocumentStatus::Submitted],
        actor: ActorRule::CurrentApprover { roles: APPROVER_ROLES },
    },
    PolicyRule {
        action: DocumentAction::Approve,
        from: &[DocumentStatus::UnderReview],
        actor: ActorRule::CurrentApprover { roles: APPROVER_ROLES },
    },
    PolicyRule {
        action: DocumentAction::Reject,
        from: &[DocumentStatus::UnderReview],
        actor: ActorRule::CurrentApprover { roles: APPROVER_ROLES },
    },
    PolicyRule {
        action: DocumentAction::Resubmit,
        from: &[DocumentStatus::Rejected],
        actor: ActorRule::Owner,
    },
    PolicyRule {
        action: DocumentAction::Archive,
        from: &[DocumentStatus::Approved, DocumentStatus::Rejected],
        actor: ActorRule::AnyOf(&[Role::Admin, Role::SuperAdmin]),
    },
];

/// Check an action against the policy table. Status mismatches are
/// `InvalidState`, actor mismatches `Unauthorized`. The lock guard is
/// separate (`ensure_unlocked`) so archive-vs-lock interactions stay
/// explicit at the call site.
pub fn authorize(action: DocumentAction, doc: &Document, actor: &User) -> Result<()> {
    let rule = POLICY
        .iter()
        .find(|r| r.action == action)
        .expect("every DocumentAction has a policy rule");

    if !rule.from.contains(&doc.status) {
        return Err(Error::InvalidState(format!(
            "{} is not allowed while document is {}",
            action.as_str(),
            doc.status.as_str()
        )));
    }

    let allowed = match rule.actor {
        ActorRule::Owner => doc.is_owner(actor.id),
        ActorRule::CurrentApprover { roles } => {
            roles.contains(&actor.role)
                && (doc.is_current_approver(actor.id) || actor.role.has_global_authority())
        }
        ActorRule::AnyOf(roles) => roles.contains(&actor.role),
    };

    if !allowed {
        return Err(Error::Unauthorized(format!(
            "{} may not {} this document",
            actor.role.as_str(),
            action.as_str()
        )));
    }
    Ok(())
}

/// Locked documents refuse every mutation except by SUPER_ADMIN.
pub fn ensure_unlocked(doc: &Document, actor: &User) -> Result<()> {
    if doc.is_locked && actor.role != Role::SuperAdmin {
        return Err(Error::DocumentLocked);
    }
    Ok(())
}
