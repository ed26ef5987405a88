use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use rosterly_core::AppError;
use rosterly_models::Role;
use rosterly_models::ids::{SessionId, UserId};

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::jwt::verify_token;

/// Extractor that validates the JWT, checks that its session has not been
/// revoked, and exposes the authenticated user's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Check if the user has a specific permission.
    ///
    /// SuperAdmin always passes; other roles consult the static table.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.role.has_permission(permission)
    }

    /// Check if the user has any of the specified permissions
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        self.0.role.has_any_permission(permissions)
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    /// Get the user ID as a typed id
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    /// Get the session ID (the token's jti)
    pub fn session_id(&self) -> Result<SessionId, AppError> {
        self.0
            .jti
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid session ID in token"))
    }

    /// Get the user's email
    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        // A token is only good while its session row exists; logout deletes it.
        let session_id: SessionId = claims
            .jti
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid session ID in token"))?;

        let session_alive = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = $1 AND expires_at > now())",
        )
        .bind(session_id)
        .fetch_one(&state.db)
        .await
        .map_err(AppError::from)?;

        if !session_alive {
            return Err(AppError::unauthorized("Session has been revoked"));
        }

        Ok(AuthUser(claims))
    }
}

/// Generates an extractor that rejects the request with 403 unless the
/// authenticated user's role grants the given permission. The permission
/// check runs before the handler body, so denied requests have no side
/// effects.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = rosterly_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if !auth_user.has_permission($permission) {
                    return Err(rosterly_core::AppError::forbidden(
                        "Access denied. You do not have permission to perform this action.",
                    ));
                }

                Ok($name(auth_user))
            }
        }
    };
}

use rosterly_core::permissions as perm;

// Users permissions
require_permission!(RequireUsersCreate, perm::USERS_CREATE);
require_permission!(RequireUsersRead, perm::USERS_READ);
require_permission!(RequireUsersUpdate, perm::USERS_UPDATE);
require_permission!(RequireUsersDelete, perm::USERS_DELETE);

// Students permissions
require_permission!(RequireStudentsCreate, perm::STUDENTS_CREATE);
require_permission!(RequireStudentsRead, perm::STUDENTS_READ);
require_permission!(RequireStudentsUpdate, perm::STUDENTS_UPDATE);
require_permission!(RequireStudentsTransfer, perm::STUDENTS_TRANSFER);
require_permission!(RequireStudentsUpdateFees, perm::STUDENTS_UPDATE_FEES);

// Teachers permissions
require_permission!(RequireTeachersCreate, perm::TEACHERS_CREATE);
require_permission!(RequireTeachersRead, perm::TEACHERS_READ);
require_permission!(RequireTeachersUpdate, perm::TEACHERS_UPDATE);
require_permission!(RequireTeachersAssign, perm::TEACHERS_ASSIGN);

// Classes permissions
require_permission!(RequireClassesCreate, perm::CLASSES_CREATE);
require_permission!(RequireClassesRead, perm::CLASSES_READ);
require_permission!(RequireClassesUpdate, perm::CLASSES_UPDATE);
require_permission!(RequireClassesDelete, perm::CLASSES_DELETE);

// Subjects permissions
require_permission!(RequireSubjectsCreate, perm::SUBJECTS_CREATE);
require_permission!(RequireSubjectsRead, perm::SUBJECTS_READ);
require_permission!(RequireSubjectsUpdate, perm::SUBJECTS_UPDATE);
require_permission!(RequireSubjectsDelete, perm::SUBJECTS_DELETE);

// Academic years permissions
require_permission!(RequireAcademicYearsCreate, perm::ACADEMIC_YEARS_CREATE);
require_permission!(RequireAcademicYearsRead, perm::ACADEMIC_YEARS_READ);
require_permission!(RequireAcademicYearsUpdate, perm::ACADEMIC_YEARS_UPDATE);
require_permission!(RequireAcademicYearsDelete, perm::ACADEMIC_YEARS_DELETE);
require_permission!(RequireAcademicYearsSetCurrent, perm::ACADEMIC_YEARS_SET_CURRENT);

// Enrollments permissions
require_permission!(RequireEnrollmentsCreate, perm::ENROLLMENTS_CREATE);
require_permission!(RequireEnrollmentsRead, perm::ENROLLMENTS_READ);
require_permission!(RequireEnrollmentsUpdate, perm::ENROLLMENTS_UPDATE);

// Dashboard permissions
require_permission!(RequireDashboardView, perm::DASHBOARD_VIEW);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::config::cors::CorsConfig;
    use crate::config::jwt::JwtConfig;
    use crate::config::lockout::LockoutConfig;
    use crate::config::rate_limit::RateLimitConfig;
    use crate::utils::jwt::create_access_token;

    fn test_state(db: PgPool) -> AppState {
        AppState {
            db,
            jwt_config: JwtConfig {
                secret: "test_secret_key_for_testing_purposes".to_string(),
                access_token_expiry: 3600,
                remember_token_expiry: 2_592_000,
            },
            cors_config: CorsConfig {
                allowed_origins: vec![],
            },
            lockout_config: LockoutConfig::default(),
            rate_limit_config: RateLimitConfig::default(),
        }
    }

    fn bearer_parts(token: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleted_session_rejects_an_otherwise_valid_token(pool: PgPool) {
        let state = test_state(pool.clone());

        let user_id = sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (first_name, last_name, email, password, role)
             VALUES ('Ada', 'Admin', $1, 'x', 'admin') RETURNING id",
        )
        .bind(format!("admin-{}@test.com", Uuid::new_v4()))
        .fetch_one(&pool)
        .await
        .unwrap();

        let session_id = SessionId::new();
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, now() + interval '30 days')",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

        let token = create_access_token(
            user_id,
            "admin@test.com",
            Role::Admin,
            session_id,
            3600,
            &state.jwt_config,
        )
        .unwrap();

        // The token authenticates while its session row is alive.
        let mut parts = bearer_parts(&token);
        let auth_user = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(auth_user.session_id().unwrap(), session_id);

        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&pool)
            .await
            .unwrap();

        // The same token still verifies, but the revoked session kills it.
        let mut parts = bearer_parts(&token);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn expired_session_row_rejects_the_token(pool: PgPool) {
        let state = test_state(pool.clone());

        let user_id = sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (first_name, last_name, email, password, role)
             VALUES ('Eli', 'Expired', $1, 'x', 'teacher') RETURNING id",
        )
        .bind(format!("teacher-{}@test.com", Uuid::new_v4()))
        .fetch_one(&pool)
        .await
        .unwrap();

        let session_id = SessionId::new();
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, now() - interval '1 minute')",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

        let token = create_access_token(
            user_id,
            "teacher@test.com",
            Role::Teacher,
            session_id,
            3600,
            &state.jwt_config,
        )
        .unwrap();

        let mut parts = bearer_parts(&token);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    fn create_test_claims(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_has_permission_by_role() {
        let admin = AuthUser(create_test_claims(Role::Admin));
        assert!(admin.has_permission(perm::USERS_READ));
        assert!(admin.has_permission(perm::STUDENTS_CREATE));
        assert!(!admin.has_permission("unknown:permission"));

        let student = AuthUser(create_test_claims(Role::Student));
        assert!(student.has_permission(perm::SUBJECTS_READ));
        assert!(!student.has_permission(perm::USERS_READ));
    }

    #[test]
    fn test_super_admin_bypass() {
        let sysadmin = AuthUser(create_test_claims(Role::SuperAdmin));
        assert!(sysadmin.has_permission(perm::USERS_DELETE));
        assert!(sysadmin.has_permission("unknown:permission"));
    }

    #[test]
    fn test_has_any_permission() {
        let teacher = AuthUser(create_test_claims(Role::Teacher));
        assert!(teacher.has_any_permission(&[perm::USERS_READ, perm::STUDENTS_READ]));
        assert!(!teacher.has_any_permission(&[perm::USERS_READ, perm::USERS_CREATE]));
    }

    #[test]
    fn test_user_and_session_ids_parse() {
        let claims = create_test_claims(Role::Admin);
        let expected_user: Uuid = claims.sub.parse().unwrap();
        let expected_session: Uuid = claims.jti.parse().unwrap();
        let auth_user = AuthUser(claims);

        assert_eq!(auth_user.user_id().unwrap().into_inner(), expected_user);
        assert_eq!(
            auth_user.session_id().unwrap().into_inner(),
            expected_session
        );
    }
}
