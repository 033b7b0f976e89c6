use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionType {
    StaffToHod,
    HodToCmd,
    HodToStaff,
    HodToHod,
}

impl SubmissionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionType::StaffToHod => "staff-to-hod",
            SubmissionType::HodToCmd => "hod-to-cmd",
            SubmissionType::HodToStaff => "hod-to-staff",
            SubmissionType::HodToHod => "hod-to-hod",
        }
    }

    pub fn parse(value: &str) -> Option<SubmissionType> {
        Some(match value {
            "staff-to-hod" => SubmissionType::StaffToHod,
            "hod-to-cmd" => SubmissionType::HodToCmd,
            "hod-to-staff" => SubmissionType::HodToStaff,
            "hod-to-hod" => SubmissionType::HodToHod,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
    RevisionRequested,
    Acknowledged,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::RevisionRequested => "revision_requested",
            SubmissionStatus::Acknowledged => "acknowledged",
        }
    }

    pub fn parse(value: &str) -> Option<SubmissionStatus> {
        Some(match value {
            "pending" => SubmissionStatus::Pending,
            "approved" => SubmissionStatus::Approved,
            "rejected" => SubmissionStatus::Rejected,
            "revision_requested" => SubmissionStatus::RevisionRequested,
            "acknowledged" => SubmissionStatus::Acknowledged,
            _ => return None,
        })
    }
}

/// A document-sharing request between two roles. Created `Pending`; leaves
/// `Pending` exactly once, by an authorized recipient action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSubmission {
    pub id: Uuid,
    pub document_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub submission_type: SubmissionType,
    pub status: SubmissionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    pub feedback: Option<String>,
    pub revision: i32,
}

impl DocumentSubmission {
    pub fn new(
        document_id: Uuid,
        from_user: Uuid,
        to_user: Uuid,
        submission_type: SubmissionType,
        now: OffsetDateTime,
    ) -> Self {
        DocumentSubmission {
            id: Uuid::new_v4(),
            document_id,
            from_user,
            to_user,
            submission_type,
            status: SubmissionStatus::Pending,
            submitted_at: now,
            reviewed_at: None,
            feedback: None,
            revision: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }
}
