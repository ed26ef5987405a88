//! The closed role enumeration and its static permission table.
//!
//! A user holds exactly one [`Role`] at a time: the single `role` column on
//! the users table makes the one-role invariant structural, and reassignment
//! is last-write-wins. The role-to-permission mapping is compiled-in
//! configuration; there are no per-user grants or revocations.

use rosterly_core::permissions as perm;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Teacher,
    Student,
}

/// Admins hold every named permission; only the SuperAdmin bypass sits above.
const ADMIN_PERMISSIONS: &[&str] = &[
    perm::USERS_CREATE,
    perm::USERS_READ,
    perm::USERS_UPDATE,
    perm::USERS_DELETE,
    perm::STUDENTS_CREATE,
    perm::STUDENTS_READ,
    perm::STUDENTS_UPDATE,
    perm::STUDENTS_TRANSFER,
    perm::STUDENTS_UPDATE_FEES,
    perm::TEACHERS_CREATE,
    perm::TEACHERS_READ,
    perm::TEACHERS_UPDATE,
    perm::TEACHERS_ASSIGN,
    perm::CLASSES_CREATE,
    perm::CLASSES_READ,
    perm::CLASSES_UPDATE,
    perm::CLASSES_DELETE,
    perm::SUBJECTS_CREATE,
    perm::SUBJECTS_READ,
    perm::SUBJECTS_UPDATE,
    perm::SUBJECTS_DELETE,
    perm::ACADEMIC_YEARS_CREATE,
    perm::ACADEMIC_YEARS_READ,
    perm::ACADEMIC_YEARS_UPDATE,
    perm::ACADEMIC_YEARS_DELETE,
    perm::ACADEMIC_YEARS_SET_CURRENT,
    perm::ENROLLMENTS_CREATE,
    perm::ENROLLMENTS_READ,
    perm::ENROLLMENTS_UPDATE,
    perm::DASHBOARD_VIEW,
];

const TEACHER_PERMISSIONS: &[&str] = &[
    perm::STUDENTS_READ,
    perm::CLASSES_READ,
    perm::SUBJECTS_READ,
    perm::ACADEMIC_YEARS_READ,
    perm::ENROLLMENTS_READ,
    perm::ENROLLMENTS_UPDATE,
    perm::DASHBOARD_VIEW,
];

const STUDENT_PERMISSIONS: &[&str] = &[
    perm::SUBJECTS_READ,
    perm::ENROLLMENTS_READ,
    perm::DASHBOARD_VIEW,
];

impl Role {
    /// The static permission set for this role.
    ///
    /// SuperAdmin returns an empty slice because its access never consults
    /// the table; see [`Role::has_permission`].
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::SuperAdmin => &[],
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Teacher => TEACHER_PERMISSIONS,
            Role::Student => STUDENT_PERMISSIONS,
        }
    }

    /// Whether this role grants the named permission.
    ///
    /// SuperAdmin short-circuits to `true` before any table lookup, including
    /// for permission names that exist nowhere in the table.
    pub fn has_permission(&self, permission: &str) -> bool {
        if matches!(self, Role::SuperAdmin) {
            return true;
        }
        self.permissions().contains(&permission)
    }

    /// Whether this role grants any of the named permissions.
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    /// The wire/database name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Post-login landing page for this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::SuperAdmin | Role::Admin => "/admin/dashboard",
            Role::Teacher => "/teacher/dashboard",
            Role::Student => "/student/dashboard",
        }
    }
}
