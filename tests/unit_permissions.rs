use rosterly_core::permissions as perm;
use rosterly_models::Role;

#[test]
fn test_super_admin_has_every_permission() {
    let all = [
        perm::USERS_CREATE,
        perm::USERS_DELETE,
        perm::STUDENTS_UPDATE_FEES,
        perm::TEACHERS_ASSIGN,
        perm::ACADEMIC_YEARS_SET_CURRENT,
        perm::ENROLLMENTS_UPDATE,
        perm::DASHBOARD_VIEW,
        // Not in any static table; SuperAdmin bypasses the lookup.
        "made.up.permission",
    ];

    for permission in all {
        assert!(Role::SuperAdmin.has_permission(permission));
    }
}

#[test]
fn test_admin_holds_every_named_permission() {
    assert!(Role::Admin.has_permission(perm::USERS_DELETE));
    assert!(Role::Admin.has_permission(perm::STUDENTS_CREATE));
    assert!(Role::Admin.has_permission(perm::TEACHERS_ASSIGN));
    assert!(Role::Admin.has_permission(perm::ACADEMIC_YEARS_SET_CURRENT));
    assert!(Role::Admin.has_permission(perm::STUDENTS_UPDATE_FEES));
}

#[test]
fn test_teacher_reads_but_cannot_manage() {
    assert!(Role::Teacher.has_permission(perm::STUDENTS_READ));
    assert!(Role::Teacher.has_permission(perm::ENROLLMENTS_UPDATE));
    assert!(Role::Teacher.has_permission(perm::DASHBOARD_VIEW));

    assert!(!Role::Teacher.has_permission(perm::USERS_CREATE));
    assert!(!Role::Teacher.has_permission(perm::STUDENTS_UPDATE_FEES));
    assert!(!Role::Teacher.has_permission(perm::ACADEMIC_YEARS_SET_CURRENT));
}

#[test]
fn test_student_is_read_only_on_own_surface() {
    assert!(Role::Student.has_permission(perm::DASHBOARD_VIEW));

    assert!(!Role::Student.has_permission(perm::STUDENTS_CREATE));
    assert!(!Role::Student.has_permission(perm::STUDENTS_UPDATE_FEES));
    assert!(!Role::Student.has_permission(perm::ENROLLMENTS_CREATE));
    assert!(!Role::Student.has_permission(perm::USERS_READ));
}

#[test]
fn test_has_any_permission() {
    assert!(Role::Teacher.has_any_permission(&[perm::USERS_CREATE, perm::STUDENTS_READ]));
    assert!(!Role::Student.has_any_permission(&[perm::USERS_CREATE, perm::USERS_DELETE]));
}

#[test]
fn test_unknown_permission_is_denied_for_non_super_admin() {
    assert!(!Role::Admin.has_permission("made.up.permission"));
    assert!(!Role::Teacher.has_permission("made.up.permission"));
    assert!(!Role::Student.has_permission("made.up.permission"));
}

#[test]
fn test_dashboard_paths_per_role() {
    assert_eq!(Role::SuperAdmin.dashboard_path(), "/admin/dashboard");
    assert_eq!(Role::Admin.dashboard_path(), "/admin/dashboard");
    assert_eq!(Role::Teacher.dashboard_path(), "/teacher/dashboard");
    assert_eq!(Role::Student.dashboard_path(), "/student/dashboard");
}
