//! Second-factor enrollment endpoints
//!
//! Setup issues a secret but leaves it disabled; verify confirms the first
//! code from the authenticator app and flips the enabled flag. Login then
//! demands a code for this account from that point on.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{totp, CurrentIdentity};
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /auth/2fa/setup response
#[derive(Debug, Serialize)]
pub struct SetupResponse {
    pub secret: String,
    pub otpauth_url: String,
}

/// POST /auth/2fa/verify request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// POST /auth/2fa/setup
pub async fn setup(
    State(state): State<AppState>,
    identity: CurrentIdentity,
) -> ApiResult<Json<SetupResponse>> {
    let user = users::get_by_id(&state.db, identity.user_id).await?;

    if user.totp_enabled {
        return Err(ApiError::BadRequest(
            "second factor is already enabled".to_string(),
        ));
    }

    // Store the secret disabled until the first code is verified
    let secret = totp::generate_secret();
    users::update_totp(&state.db, user.id, Some(&secret), false).await?;

    let otpauth_url = totp::otpauth_uri(&user.email, &secret);

    Ok(Json(SetupResponse { secret, otpauth_url }))
}

/// POST /auth/2fa/verify
pub async fn verify(
    State(state): State<AppState>,
    identity: CurrentIdentity,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if request.code.trim().is_empty() {
        return Err(ApiError::BadRequest("code is required".to_string()));
    }

    let user = users::get_by_id(&state.db, identity.user_id).await?;

    let secret = user
        .totp_secret
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("no second factor setup in progress".to_string()))?;

    if !totp::verify_code(secret, request.code.trim()) {
        return Err(ApiError::BadRequest("invalid second factor code".to_string()));
    }

    users::update_totp(&state.db, user.id, Some(secret), true).await?;

    tracing::info!(user_id = %user.id, "Second factor enabled");

    Ok(Json(serde_json::json!({ "message": "Second factor enabled" })))
}

/// Build second-factor routes
pub fn twofactor_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/2fa/setup", post(setup))
        .route("/auth/2fa/verify", post(verify))
}
