use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    complete_enrollment, drop_enrollment, enroll_student, get_enrollment, get_enrollments,
    get_student_enrollments,
};

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(enroll_student).get(get_enrollments))
        .route("/{id}", get(get_enrollment))
        .route("/students/{id}", get(get_student_enrollments))
        .route("/{id}/complete", post(complete_enrollment))
        .route("/{id}/drop", post(drop_enrollment))
}
