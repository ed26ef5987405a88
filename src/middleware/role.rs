//! Role-based authorization middleware.
//!
//! Route groups that are exclusive to one or two roles are gated with these
//! layer functions; finer-grained checks use the permission extractors in
//! [`crate::middleware::auth`].

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use rosterly_core::AppError;
use rosterly_models::Role;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Checks that the authenticated user holds one of the allowed roles before
/// the request reaches the handler.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<Role>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(
            "Access denied. You do not have permission to perform this action.",
        ));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Layer for routes only SuperAdmins may reach.
pub async fn require_super_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, vec![Role::SuperAdmin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Layer for admin-level routes (SuperAdmin or Admin).
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![Role::SuperAdmin, Role::Admin],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
