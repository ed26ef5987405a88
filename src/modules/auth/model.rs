use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use rosterly_models::Role;

use crate::modules::users::model::User;

/// JWT claims. `jti` identifies the session row created at login; deleting
/// that row (logout, deactivation) revokes the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub role: Role,
    pub jti: String, // session_id
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Issue a long-lived token instead of the default expiry.
    #[serde(default)]
    pub remember: bool,
    /// Protected URL the caller originally wanted; used as the redirect
    /// target instead of the role default when present.
    pub intended: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    /// Post-login destination: the intended URL if one was captured,
    /// otherwise the role's dashboard.
    pub redirect_to: String,
    pub user: User,
}
