//! Report submission endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use skf_common::db::models::Report;
use uuid::Uuid;

use crate::auth::CurrentIdentity;
use crate::db::reports;
use crate::error::ApiResult;
use crate::AppState;

/// POST /reports request
#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub organization_id: Uuid,
    pub category: String,
    pub title: String,
    pub body: String,
    pub severity: i64,
    #[serde(default = "default_anonymous")]
    pub is_anonymous: bool,
}

fn default_anonymous() -> bool {
    true
}

/// POST /reports
///
/// Submits a report. By the time this returns, the organization's sketch
/// score already reflects it.
pub async fn submit(
    State(state): State<AppState>,
    identity: CurrentIdentity,
    Json(request): Json<SubmitReportRequest>,
) -> ApiResult<Json<Report>> {
    let report = reports::submit(
        &state.db,
        reports::NewReport {
            organization_id: request.organization_id,
            user_id: identity.user_id,
            category: request.category,
            title: request.title,
            body: request.body,
            severity: request.severity,
            is_anonymous: request.is_anonymous,
        },
    )
    .await?;

    Ok(Json(report))
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/reports", post(submit))
}
