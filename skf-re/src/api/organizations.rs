//! Organization registry and query endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use skf_common::db::models::{Category, Organization};

use crate::auth::CurrentIdentity;
use crate::db::{organizations, reports};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /organizations query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// GET /organizations/{slug} query parameters
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub category: Option<String>,
}

/// POST /organizations request
#[derive(Debug, Deserialize)]
pub struct RegisterOrganizationRequest {
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

/// Organization detail: the record plus its reports, newest first
#[derive(Debug, Serialize)]
pub struct OrganizationDetail {
    pub organization: Organization,
    pub reports: Vec<reports::ReportView>,
}

/// GET /organizations
///
/// Lists all organizations, or searches name/industry/location when `q` is
/// present. Worst sketch score first either way.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Organization>>> {
    let organizations = match query.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => organizations::search(&state.db, term).await?,
        _ => organizations::list_all(&state.db).await?,
    };

    Ok(Json(organizations))
}

/// POST /organizations
pub async fn register(
    State(state): State<AppState>,
    identity: CurrentIdentity,
    Json(request): Json<RegisterOrganizationRequest>,
) -> ApiResult<Json<Organization>> {
    let organization = organizations::register(
        &state.db,
        organizations::NewOrganization {
            name: request.name,
            industry: request.industry,
            location: request.location,
            website: request.website,
            logo_url: request.logo_url,
        },
    )
    .await?;

    tracing::info!(
        organization_id = %organization.id,
        registered_by = %identity.user_id,
        "Organization registered"
    );

    Ok(Json(organization))
}

/// GET /organizations/{slug}
///
/// Organization plus its reports; `?category=` narrows the report list.
pub async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DetailQuery>,
) -> ApiResult<Json<OrganizationDetail>> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(ApiError::from)?;

    let organization = organizations::get_by_slug(&state.db, &slug).await?;
    let reports = reports::list_by_organization(&state.db, organization.id, category).await?;

    Ok(Json(OrganizationDetail { organization, reports }))
}

/// GET /organizations/{slug}/categories
pub async fn categories(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<reports::CategoryCount>>> {
    let organization = organizations::get_by_slug(&state.db, &slug).await?;
    let breakdown = reports::category_breakdown(&state.db, organization.id).await?;

    Ok(Json(breakdown))
}

/// Build organization routes
pub fn organization_routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", get(list))
        .route("/organizations", post(register))
        .route("/organizations/:slug", get(detail))
        .route("/organizations/:slug/categories", get(categories))
}
