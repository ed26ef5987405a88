//! Permission name constants.
//!
//! Centralized permission strings used by the role→permission table and the
//! route guards. Use these constants instead of string literals so renames
//! stay consistent across the codebase.

// =============================================================================
// Users permissions
// =============================================================================

/// Permission to create users
pub const USERS_CREATE: &str = "users:create";
/// Permission to read users
pub const USERS_READ: &str = "users:read";
/// Permission to update users
pub const USERS_UPDATE: &str = "users:update";
/// Permission to deactivate/reactivate users
pub const USERS_DELETE: &str = "users:delete";

// =============================================================================
// Students permissions
// =============================================================================

/// Permission to create students
pub const STUDENTS_CREATE: &str = "students:create";
/// Permission to read students
pub const STUDENTS_READ: &str = "students:read";
/// Permission to update students
pub const STUDENTS_UPDATE: &str = "students:update";
/// Permission to transfer a student between classes
pub const STUDENTS_TRANSFER: &str = "students:transfer";
/// Permission to record fee payments
pub const STUDENTS_UPDATE_FEES: &str = "students:update_fees";

// =============================================================================
// Teachers permissions
// =============================================================================

/// Permission to create teachers
pub const TEACHERS_CREATE: &str = "teachers:create";
/// Permission to read teachers
pub const TEACHERS_READ: &str = "teachers:read";
/// Permission to update teachers
pub const TEACHERS_UPDATE: &str = "teachers:update";
/// Permission to assign subjects/classes to teachers
pub const TEACHERS_ASSIGN: &str = "teachers:assign";

// =============================================================================
// Classes permissions
// =============================================================================

/// Permission to create classes
pub const CLASSES_CREATE: &str = "classes:create";
/// Permission to read classes
pub const CLASSES_READ: &str = "classes:read";
/// Permission to update classes
pub const CLASSES_UPDATE: &str = "classes:update";
/// Permission to delete classes
pub const CLASSES_DELETE: &str = "classes:delete";

// =============================================================================
// Subjects permissions
// =============================================================================

/// Permission to create subjects
pub const SUBJECTS_CREATE: &str = "subjects:create";
/// Permission to read subjects
pub const SUBJECTS_READ: &str = "subjects:read";
/// Permission to update subjects
pub const SUBJECTS_UPDATE: &str = "subjects:update";
/// Permission to delete subjects
pub const SUBJECTS_DELETE: &str = "subjects:delete";

// =============================================================================
// Academic years permissions
// =============================================================================

/// Permission to create academic years
pub const ACADEMIC_YEARS_CREATE: &str = "academic_years:create";
/// Permission to read academic years
pub const ACADEMIC_YEARS_READ: &str = "academic_years:read";
/// Permission to update academic years
pub const ACADEMIC_YEARS_UPDATE: &str = "academic_years:update";
/// Permission to delete academic years
pub const ACADEMIC_YEARS_DELETE: &str = "academic_years:delete";
/// Permission to mark an academic year as current
pub const ACADEMIC_YEARS_SET_CURRENT: &str = "academic_years:set_current";

// =============================================================================
// Enrollments permissions
// =============================================================================

/// Permission to enroll students in subjects
pub const ENROLLMENTS_CREATE: &str = "enrollments:create";
/// Permission to read enrollments
pub const ENROLLMENTS_READ: &str = "enrollments:read";
/// Permission to complete/drop enrollments
pub const ENROLLMENTS_UPDATE: &str = "enrollments:update";

// =============================================================================
// Dashboard permissions
// =============================================================================

/// Permission to view the role dashboard
pub const DASHBOARD_VIEW: &str = "dashboard:view";
