//! Report vote endpoint

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use skf_common::db::models::VoteDirection;
use uuid::Uuid;

use crate::auth::CurrentIdentity;
use crate::db::votes;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /reports/{id}/vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: String,
}

/// POST /reports/{id}/vote
///
/// Casts or replaces the caller's vote on a report and returns the updated
/// tally.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    identity: CurrentIdentity,
    Json(request): Json<VoteRequest>,
) -> ApiResult<Json<votes::VoteTally>> {
    let direction: VoteDirection = request.direction.parse().map_err(ApiError::from)?;

    let tally = votes::cast_vote(&state.db, report_id, identity.user_id, direction).await?;

    Ok(Json(tally))
}

/// Build vote routes
pub fn vote_routes() -> Router<AppState> {
    Router::new().route("/reports/:id/vote", post(cast_vote))
}
