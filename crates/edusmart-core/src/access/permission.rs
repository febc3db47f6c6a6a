//! Action-level permission matrix.
//!
//! This only drives what the client offers; the server re-checks everything.

use crate::session::Role;

/// Actions the dashboards gate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    CanCreateUser,
    CanDeleteUser,
    CanManageCampus,
    CanManageClasses,
    CanRegisterStudent,
    CanPromoteStudent,
    CanMarkAttendance,
    CanEntryMarks,
    CanCollectFees,
    CanWaiveFines,
    CanViewGlobalReports,
    CanViewCampusReports,
}

impl Permission {
    pub const ALL: [Permission; 12] = [
        Permission::CanCreateUser,
        Permission::CanDeleteUser,
        Permission::CanManageCampus,
        Permission::CanManageClasses,
        Permission::CanRegisterStudent,
        Permission::CanPromoteStudent,
        Permission::CanMarkAttendance,
        Permission::CanEntryMarks,
        Permission::CanCollectFees,
        Permission::CanWaiveFines,
        Permission::CanViewGlobalReports,
        Permission::CanViewCampusReports,
    ];

    /// Constant-style name, e.g. `CAN_COLLECT_FEES`.
    pub fn name(&self) -> &'static str {
        match self {
            Permission::CanCreateUser => "CAN_CREATE_USER",
            Permission::CanDeleteUser => "CAN_DELETE_USER",
            Permission::CanManageCampus => "CAN_MANAGE_CAMPUS",
            Permission::CanManageClasses => "CAN_MANAGE_CLASSES",
            Permission::CanRegisterStudent => "CAN_REGISTER_STUDENT",
            Permission::CanPromoteStudent => "CAN_PROMOTE_STUDENT",
            Permission::CanMarkAttendance => "CAN_MARK_ATTENDANCE",
            Permission::CanEntryMarks => "CAN_ENTRY_MARKS",
            Permission::CanCollectFees => "CAN_COLLECT_FEES",
            Permission::CanWaiveFines => "CAN_WAIVE_FINES",
            Permission::CanViewGlobalReports => "CAN_VIEW_GLOBAL_REPORTS",
            Permission::CanViewCampusReports => "CAN_VIEW_CAMPUS_REPORTS",
        }
    }

    pub fn allowed_roles(&self) -> Vec<Role> {
        use Role::*;
        match self {
            Permission::CanCreateUser
            | Permission::CanDeleteUser
            | Permission::CanManageCampus
            | Permission::CanViewGlobalReports => vec![SuperAdmin],
            Permission::CanManageClasses
            | Permission::CanRegisterStudent
            | Permission::CanPromoteStudent
            | Permission::CanViewCampusReports => vec![SuperAdmin, Admin],
            Permission::CanMarkAttendance => vec![ClassTeacher],
            Permission::CanEntryMarks => vec![ClassTeacher, Teacher],
            Permission::CanCollectFees => vec![SuperAdmin, Accountant],
            Permission::CanWaiveFines => vec![SuperAdmin, ClassTeacher],
        }
    }
}

pub fn has_permission(role: &Role, permission: Permission) -> bool {
    permission.allowed_roles().contains(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_collection_roles() {
        assert!(has_permission(&Role::Accountant, Permission::CanCollectFees));
        assert!(has_permission(&Role::SuperAdmin, Permission::CanCollectFees));
        assert!(!has_permission(&Role::Teacher, Permission::CanCollectFees));
    }

    #[test]
    fn test_attendance_is_class_teacher_only() {
        assert!(has_permission(&Role::ClassTeacher, Permission::CanMarkAttendance));
        assert!(!has_permission(&Role::SuperAdmin, Permission::CanMarkAttendance));
    }

    #[test]
    fn test_super_admin_lacks_only_classroom_permissions() {
        let granted: Vec<_> = Permission::ALL
            .iter()
            .filter(|p| has_permission(&Role::SuperAdmin, **p))
            .map(|p| p.name())
            .collect();
        assert!(!granted.contains(&"CAN_MARK_ATTENDANCE"));
        assert!(!granted.contains(&"CAN_ENTRY_MARKS"));
        assert_eq!(granted.len(), Permission::ALL.len() - 2);
    }

    #[test]
    fn test_unknown_role_has_no_permissions() {
        let role = Role::Other("LIBRARIAN".into());
        assert!(!has_permission(&role, Permission::CanViewCampusReports));
    }
}
