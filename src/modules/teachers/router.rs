use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    assign_class, assign_subject, can_teach_subject, create_teacher, get_teacher, get_teachers,
    update_teacher,
};

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_teacher).get(get_teachers))
        .route("/{id}", get(get_teacher).patch(update_teacher))
        .route("/{id}/subjects", post(assign_subject))
        .route("/{id}/classes", post(assign_class))
        .route("/{id}/can-teach/{subject_id}", get(can_teach_subject))
}
