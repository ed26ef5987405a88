//! JWT creation and verification.
//!
//! Every token carries a `jti` that matches a row in the sessions table. A
//! fresh `jti` is minted on every login and the row is deleted on logout, so
//! tokens are revocable despite being stateless to verify.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use rosterly_core::AppError;
use rosterly_models::Role;
use rosterly_models::ids::{SessionId, UserId};

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;

pub fn create_access_token(
    user_id: UserId,
    email: &str,
    role: Role,
    session_id: SessionId,
    expiry_seconds: i64,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + expiry_seconds as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        jti: session_id.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}
