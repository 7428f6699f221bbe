//! Request identity extraction
//!
//! The single seam between transport and the identity provider: handlers
//! declare a `CurrentIdentity` parameter and never touch the users table for
//! authorization themselves. Requests without a valid bearer session are
//! rejected with 401 before the handler body runs.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts, http::HeaderMap};
use uuid::Uuid;

use crate::{db::sessions, error::ApiError, AppState};

/// The authenticated identity behind a request
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// True when the account logged in through its enabled second factor
    pub second_factor_verified: bool,
}

/// Pull the bearer token out of the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))?;

        let user = sessions::find_valid(&state.db, &token)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("session is invalid or expired".to_string()))?;

        Ok(CurrentIdentity {
            user_id: user.id,
            email: user.email,
            name: user.name,
            second_factor_verified: user.totp_enabled,
        })
    }
}
