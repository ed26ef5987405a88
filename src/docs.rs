use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use rosterly_core::{PaginationMeta, PaginationParams};
use rosterly_models::{AssignmentStatus, EnrollmentStatus, FeeStatus, Role};

use crate::modules::academic_years::model::{
    AcademicYear, AcademicYearFilterParams, CreateAcademicYearDto,
    PaginatedAcademicYearsResponse, UpdateAcademicYearDto,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse};
use crate::modules::classes::model::{
    ClassFilterParams, CreateClassDto, PaginatedClassesResponse, SchoolClass, UpdateClassDto,
};
use crate::modules::dashboard::model::{
    AdminDashboard, DashboardSummary, StudentDashboard, TeacherDashboard,
};
use crate::modules::enrollments::model::{
    CompleteEnrollmentDto, EnrollStudentDto, Enrollment, EnrollmentFilterParams,
    PaginatedEnrollmentsResponse,
};
use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, RecordFeePaymentDto, Student,
    StudentFilterParams, TransferStudentDto, UpdateStudentDto,
};
use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use crate::modules::teachers::model::{
    AssignClassDto, AssignSubjectDto, CanTeachResponse, ClassAssignment, CreateTeacherDto,
    PaginatedTeachersResponse, SubjectAssignment, Teacher, TeacherFilterParams, UpdateTeacherDto,
};
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::deactivate_user,
        crate::modules::users::controller::reactivate_user,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::transfer_student,
        crate::modules::students::controller::record_fee_payment,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::assign_subject,
        crate::modules::teachers::controller::assign_class,
        crate::modules::teachers::controller::can_teach_subject,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::academic_years::controller::create_academic_year,
        crate::modules::academic_years::controller::get_academic_years,
        crate::modules::academic_years::controller::get_current_academic_year,
        crate::modules::academic_years::controller::get_academic_year,
        crate::modules::academic_years::controller::update_academic_year,
        crate::modules::academic_years::controller::set_current_academic_year,
        crate::modules::academic_years::controller::delete_academic_year,
        crate::modules::enrollments::controller::enroll_student,
        crate::modules::enrollments::controller::get_enrollments,
        crate::modules::enrollments::controller::get_enrollment,
        crate::modules::enrollments::controller::get_student_enrollments,
        crate::modules::enrollments::controller::complete_enrollment,
        crate::modules::enrollments::controller::drop_enrollment,
        crate::modules::dashboard::controller::get_dashboard,
    ),
    components(
        schemas(
            Role,
            EnrollmentStatus,
            AssignmentStatus,
            FeeStatus,
            LoginRequest,
            LoginResponse,
            ErrorResponse,
            User,
            CreateUserDto,
            UpdateUserDto,
            UserFilterParams,
            PaginatedUsersResponse,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            TransferStudentDto,
            RecordFeePaymentDto,
            StudentFilterParams,
            PaginatedStudentsResponse,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            AssignSubjectDto,
            AssignClassDto,
            SubjectAssignment,
            ClassAssignment,
            CanTeachResponse,
            TeacherFilterParams,
            PaginatedTeachersResponse,
            SchoolClass,
            CreateClassDto,
            UpdateClassDto,
            ClassFilterParams,
            PaginatedClassesResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            SubjectFilterParams,
            PaginatedSubjectsResponse,
            AcademicYear,
            CreateAcademicYearDto,
            UpdateAcademicYearDto,
            AcademicYearFilterParams,
            PaginatedAcademicYearsResponse,
            Enrollment,
            EnrollStudentDto,
            CompleteEnrollmentDto,
            EnrollmentFilterParams,
            PaginatedEnrollmentsResponse,
            DashboardSummary,
            AdminDashboard,
            TeacherDashboard,
            StudentDashboard,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Session login and logout"),
        (name = "Users", description = "User account management"),
        (name = "Students", description = "Student profiles, transfers, and fees"),
        (name = "Teachers", description = "Teacher profiles and assignments"),
        (name = "Classes", description = "Class management"),
        (name = "Subjects", description = "Subject catalogue"),
        (name = "Academic Years", description = "Academic year lifecycle"),
        (name = "Enrollments", description = "Subject enrollment lifecycle"),
        (name = "Dashboard", description = "Role-specific dashboards")
    ),
    info(
        title = "Rosterly API",
        version = "0.1.0",
        description = "A school administration REST API built with Rust, Axum, and PostgreSQL featuring role-based access control.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
