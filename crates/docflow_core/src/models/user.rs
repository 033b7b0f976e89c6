use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organizational roles recognized by the workflow.
///
/// The first five drive the approval hierarchy; the extended roles exist so
/// dashboards and message routing can address every office in the hospital,
/// and they participate in messaging like STAFF does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cmd,
    Hod,
    Staff,
    Admin,
    SuperAdmin,
    Cmac,
    HeadOfNursing,
    Registry,
    DirectorAdmin,
    ChiefAccountant,
    ChiefProcurementOfficer,
    MedicalRecordsOfficer,
    HeadOfUnit,
}

impl Role {
    /// Roles that may hold a step in an approval chain.
    pub fn can_approve(self) -> bool {
        matches!(self, Role::Hod | Role::Cmd | Role::Admin | Role::SuperAdmin)
    }

    /// CMD and SUPER_ADMIN act on any document regardless of who the
    /// designated current approver is.
    pub fn has_global_authority(self) -> bool {
        matches!(self, Role::Cmd | Role::SuperAdmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Cmd => "cmd",
            Role::Hod => "hod",
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
            Role::Cmac => "cmac",
            Role::HeadOfNursing => "head_of_nursing",
            Role::Registry => "registry",
            Role::DirectorAdmin => "director_admin",
            Role::ChiefAccountant => "chief_accountant",
            Role::ChiefProcurementOfficer => "chief_procurement_officer",
            Role::MedicalRecordsOfficer => "medical_records_officer",
            Role::HeadOfUnit => "head_of_unit",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        Some(match value {
            "cmd" => Role::Cmd,
            "hod" => Role::Hod,
            "staff" => Role::Staff,
            "admin" => Role::Admin,
            "super_admin" => Role::SuperAdmin,
            "cmac" => Role::Cmac,
            "head_of_nursing" => Role::HeadOfNursing,
            "registry" => Role::Registry,
            "director_admin" => Role::DirectorAdmin,
            "chief_accountant" => Role::ChiefAccountant,
            "chief_procurement_officer" => Role::ChiefProcurementOfficer,
            "medical_records_officer" => Role::MedicalRecordsOfficer,
            "head_of_unit" => Role::HeadOfUnit,
            _ => return None,
        })
    }
}

/// A workflow actor. Identity is immutable; role and department only change
/// through admin action outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub department: String,
    pub active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            Role::Cmd,
            Role::Hod,
            Role::Staff,
            Role::Admin,
            Role::SuperAdmin,
            Role::Cmac,
            Role::HeadOfNursing,
            Role::Registry,
            Role::DirectorAdmin,
            Role::ChiefAccountant,
            Role::ChiefProcurementOfficer,
            Role::MedicalRecordsOfficer,
            Role::HeadOfUnit,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn approval_authority() {
        assert!(Role::Hod.can_approve());
        assert!(Role::Cmd.can_approve());
        assert!(!Role::Staff.can_approve());
        assert!(!Role::Registry.can_approve());
        assert!(Role::SuperAdmin.has_global_authority());
        assert!(!Role::Admin.has_global_authority());
    }
}
