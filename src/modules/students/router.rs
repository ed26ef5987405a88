use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_student, get_student, get_students, record_fee_payment, transfer_student,
    update_student,
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route("/{id}", get(get_student).patch(update_student))
        .route("/{id}/transfer", post(transfer_student))
        .route("/{id}/fees", post(record_fee_payment))
}
