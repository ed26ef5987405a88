use axum::{Json, extract::State};
use tracing::instrument;

use rosterly_core::AppError;

use crate::middleware::auth::RequireDashboardView;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::dashboard::model::DashboardSummary;
use crate::modules::dashboard::service::DashboardService;
use crate::state::AppState;

/// Get the dashboard for the authenticated user's role
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Role-specific dashboard", body = DashboardSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: RequireDashboardView,
) -> Result<Json<DashboardSummary>, AppError> {
    let user_id = auth.0.user_id()?;
    let summary = DashboardService::summary(&state.db, user_id, auth.0.role()).await?;

    Ok(Json(summary))
}
