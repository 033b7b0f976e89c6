//! The submission router: which role pairs may exchange documents, and how
//! a pending submission is reviewed.

use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::models::submission::{DocumentSubmission, SubmissionStatus, SubmissionType};
use crate::models::user::{Role, User};

/// One row of the routing matrix.
pub struct Route {
    pub submission_type: SubmissionType,
    pub from_role: Role,
    pub to_role: Role,
    pub same_department: bool,
}

/// staff→HOD and HOD→staff stay inside one department; HOD→CMD and HOD→HOD
/// cross department boundaries freely.
pub const ROUTES: &[Route] = &[
    Route {
        submission_type: SubmissionType::StaffToHod,
        from_role: Role::Staff,
        to_role: Role::Hod,
        same_department: true,
    },
    Route {
        submission_type: SubmissionType::HodToStaff,
        from_role: Role::Hod,
        to_role: Role::Staff,
        same_department: true,
    },
    Route {
        submission_type: SubmissionType::HodToCmd,
        from_role: Role::Hod,
        to_role: Role::Cmd,
        same_department: false,
    },
    Route {
        submission_type: SubmissionType::HodToHod,
        from_role: Role::Hod,
        to_role: Role::Hod,
        same_department: false,
    },
];

/// Validate sender and recipient against the routing matrix.
pub fn validate_route(submission_type: SubmissionType, from: &User, to: &User) -> Result<()> {
    let route = ROUTES
        .iter()
        .find(|r| r.submission_type == submission_type)
        .expect("every SubmissionType has a route");

    if from.role != route.from_role {
        return Err(Error::InvalidRoute(format!(
            "{} requires sender role {}, got {}",
            submission_type.as_str(),
            route.from_role.as_str(),
            from.role.as_str()
        )));
    }
    if to.role != route.to_role {
        return Err(Error::InvalidRoute(format!(
            "{} requires recipient role {}, got {}",
            submission_type.as_str(),
            route.to_role.as_str(),
            to.role.as_str()
        )));
    }
    if route.same_department && from.department != to.department {
        return Err(Error::InvalidRoute(format!(
            "{} must stay within one department ({} vs {})",
            submission_type.as_str(),
            from.department,
            to.department
        )));
    }
    Ok(())
}

/// The recipient's verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionDecision {
    Approve,
    Reject,
    RequestRevision,
    Acknowledge,
}

impl SubmissionDecision {
    pub fn resulting_status(self) -> SubmissionStatus {
        match self {
            SubmissionDecision::Approve => SubmissionStatus::Approved,
            SubmissionDecision::Reject => SubmissionStatus::Rejected,
            SubmissionDecision::RequestRevision => SubmissionStatus::RevisionRequested,
            SubmissionDecision::Acknowledge => SubmissionStatus::Acknowledged,
        }
    }
}

/// Apply the recipient's decision. Only the addressed recipient (or CMD,
/// ADMIN, SUPER_ADMIN working the pending queue on their behalf) may move a
/// submission away from `Pending`, and only once.
pub fn review_submission(
    submission: &mut DocumentSubmission,
    reviewer: &User,
    decision: SubmissionDecision,
    feedback: Option<&str>,
    now: OffsetDateTime,
) -> Result<()> {
    if !submission.is_pending() {
        return Err(Error::AlreadyReviewed);
    }
    let on_behalf = matches!(reviewer.role, Role::Cmd | Role::Admin | Role::SuperAdmin);
    if submission.to_user != reviewer.id && !on_behalf {
        return Err(Error::Unauthorized(
            "only the submission recipient may review it".to_string(),
        ));
    }
    if decision == SubmissionDecision::RequestRevision
        && feedback.map_or(true, |f| f.trim().is_empty())
    {
        return Err(Error::Validation(
            "revision requests must say what to revise".to_string(),
        ));
    }

    submission.status = decision.resulting_status();
    submission.feedback = feedback.map(str::to_string);
    submission.reviewed_at = Some(now);
    Ok(())
}
