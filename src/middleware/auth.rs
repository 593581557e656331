use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::Role};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub supplier_id: Option<Uuid>,
}

/// Optional variant for endpoints that behave differently when a valid token
/// is present but never reject anonymous callers (public scans, analytics).
#[derive(Debug, Clone, Default)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

pub fn ensure_roles(user: &AuthUser, roles: &[Role]) -> Result<(), AppError> {
    if !roles.contains(&user.role) {
        tracing::warn!(user_id = %user.user_id, role = ?user.role, "insufficient permissions");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_roles(user, &[Role::Admin])
}

fn decode_bearer(parts: &axum::http::request::Parts) -> Result<AuthUser, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
    }
    let token = auth_str.trim_start_matches("Bearer ").trim();

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
    let role = Role::parse(&decoded.claims.role)
        .map_err(|_| AppError::Unauthorized("Invalid role in token".into()))?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email.clone(),
        role,
        supplier_id: decoded.claims.supplier_id,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        decode_bearer(parts)
    }
}

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(decode_bearer(parts).ok()))
    }
}
