use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{
        AuthResponse, ChangePasswordRequest, Claims, LoginRequest, RefreshRequest,
        RegisterRequest, TokenPair,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, User},
    response::ApiResponse,
};

const ACCESS_TOKEN_HOURS: i64 = 24;
const REFRESH_TOKEN_HOURS: i64 = 24 * 7;

fn jwt_secret() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

fn issue_token(user: &User, hours: i64) -> AppResult<String> {
    let secret = jwt_secret()?;
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.clone(),
        supplier_id: user.supplier_id,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn issue_token_pair(user: &User) -> AppResult<(String, String)> {
    Ok((
        issue_token(user, ACCESS_TOKEN_HOURS)?,
        issue_token(user, REFRESH_TOKEN_HOURS)?,
    ))
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters long".into(),
        ));
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(AppError::BadRequest(
            "Password must contain an uppercase letter, a lowercase letter, and a digit".into(),
        ));
    }
    Ok(())
}

pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        email,
        password,
        name,
        role,
        supplier_id,
    } = payload;

    if name.len() < 2 || name.len() > 100 {
        return Err(AppError::BadRequest(
            "Name must be between 2 and 100 characters".into(),
        ));
    }
    validate_password(&password)?;
    if role == Role::Supplier && supplier_id.is_none() {
        return Err(AppError::BadRequest(
            "Supplier users must reference a supplier".into(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role, supplier_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(email.as_str())
    .bind(password_hash)
    .bind(name.as_str())
    .bind(role.as_str())
    .bind(supplier_id)
    .fetch_one(pool)
    .await?;

    let (access_token, refresh_token) = issue_token_pair(&user)?;

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": user.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User registered successfully",
        AuthResponse {
            user,
            access_token,
            refresh_token,
        },
        None,
    ))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    let user = match user {
        Some(u) if u.is_active => u,
        _ => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let user: User = sqlx::query_as(
        "UPDATE users SET last_login = NOW(), updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .fetch_one(pool)
    .await?;

    let (access_token, refresh_token) = issue_token_pair(&user)?;

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Login successful",
        AuthResponse {
            user,
            access_token,
            refresh_token,
        },
        None,
    ))
}

pub async fn refresh_tokens(
    pool: &DbPool,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<TokenPair>> {
    let secret = jwt_secret()?;
    let decoded = decode::<Claims>(
        &payload.refresh_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    let user: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("User not found or inactive".into())),
    };

    let (access_token, refresh_token) = issue_token_pair(&user)?;

    Ok(ApiResponse::success(
        "Token refreshed successfully",
        TokenPair {
            access_token,
            refresh_token,
        },
        None,
    ))
}

pub async fn get_profile(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let profile: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;

    match profile {
        Some(p) => Ok(ApiResponse::data(p)),
        None => Err(AppError::NotFound),
    }
}

pub async fn change_password(
    pool: &DbPool,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_password(&payload.new_password)?;

    let stored: Option<(String,)> =
        sqlx::query_as("SELECT password_hash FROM users WHERE id = $1 AND is_active = TRUE")
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;

    let stored = match stored {
        Some((hash,)) => hash,
        None => return Err(AppError::NotFound),
    };

    if !verify_password(&payload.current_password, &stored)? {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    let new_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user.user_id)
        .bind(new_hash)
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "user_change_password",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Password changed successfully",
        serde_json::json!({}),
        None,
    ))
}

pub async fn logout(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<serde_json::Value>> {
    // Tokens are stateless; logout is client-side. Record it for the audit trail.
    if let Err(err) = log_audit(pool, Some(user.user_id), "user_logout", Some("users"), None).await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged out successfully",
        serde_json::json!({}),
        None,
    ))
}
