//! Account registration and session endpoints

use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{identity::bearer_token, password, totp, CurrentIdentity};
use crate::db::{sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /auth/register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// POST /auth/register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub message: String,
}

/// POST /auth/login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub totp_code: Option<String>,
}

/// POST /auth/login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
    pub totp_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// POST /auth/register
///
/// Creates an account. Email and password are required; the password must be
/// at least 8 characters. A duplicate email fails before any write.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }
    if request.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let salt = password::generate_salt();
    let hash = password::hash_password(&salt, &request.password);

    let user = users::create_user(
        &state.db,
        users::NewUser {
            email: email.to_string(),
            name: request.name,
            password_hash: hash,
            password_salt: salt,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Account created");

    Ok(Json(RegisterResponse {
        id: user.id,
        message: "Account created successfully".to_string(),
    }))
}

/// POST /auth/login
///
/// Verifies the password (and second-factor code when the account has one
/// enabled), then issues a bearer session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let invalid = || ApiError::Unauthorized("invalid email or password".to_string());

    let user = users::find_by_email(&state.db, request.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let (hash, salt) = match (&user.password_hash, &user.password_salt) {
        (Some(hash), Some(salt)) => (hash, salt),
        _ => return Err(invalid()),
    };

    if !password::verify_password(salt, hash, &request.password) {
        return Err(invalid());
    }

    if user.totp_enabled {
        let secret = user
            .totp_secret
            .as_deref()
            .ok_or_else(|| ApiError::Internal("second factor enabled without a secret".to_string()))?;

        let code = request
            .totp_code
            .as_deref()
            .ok_or_else(|| ApiError::Unauthorized("second factor code required".to_string()))?;

        if !totp::verify_code(secret, code) {
            return Err(ApiError::Unauthorized("invalid second factor code".to_string()));
        }
    }

    let session = sessions::create_session(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "Login succeeded");

    Ok(Json(LoginResponse {
        token: session.id,
        user: UserInfo {
            id: user.id,
            email: user.email,
            name: user.name,
        },
        totp_enabled: user.totp_enabled,
    }))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    _identity: CurrentIdentity,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(token) = bearer_token(&headers) {
        sessions::delete_session(&state.db, &token).await?;
    }

    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

/// Build authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}
