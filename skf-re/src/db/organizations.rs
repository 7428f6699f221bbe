//! Organization registry database operations

use skf_common::db::models::Organization;
use skf_common::slug::slugify;
use skf_common::{Error, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Fields accepted when registering an organization
#[derive(Debug, Clone, Default)]
pub struct NewOrganization {
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

const ORGANIZATION_COLUMNS: &str = "id, name, slug, industry, location, website, logo_url, \
     sketch_score, total_reports, created_at, updated_at";

fn row_to_organization(row: &sqlx::sqlite::SqliteRow) -> Result<Organization> {
    let id: String = row.get("id");

    Ok(Organization {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
        name: row.get("name"),
        slug: row.get("slug"),
        industry: row.get("industry"),
        location: row.get("location"),
        website: row.get("website"),
        logo_url: row.get("logo_url"),
        sketch_score: row.get("sketch_score"),
        total_reports: row.get("total_reports"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Register a new organization
///
/// The slug is derived from the name here, exactly once. A collision with an
/// existing slug fails with `DuplicateSlug`; the caller may retry with a
/// disambiguated name, the registry never auto-suffixes.
pub async fn register(pool: &SqlitePool, new: NewOrganization) -> Result<Organization> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("organization name is required".to_string()));
    }

    let slug = slugify(name);
    if slug.is_empty() {
        return Err(Error::InvalidInput(
            "organization name must contain at least one alphanumeric character".to_string(),
        ));
    }

    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO organizations (id, name, slug, industry, location, website, logo_url)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(name)
    .bind(&slug)
    .bind(&new.industry)
    .bind(&new.location)
    .bind(&new.website)
    .bind(&new.logo_url)
    .execute(pool)
    .await
    .map_err(|e| {
        if e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false) {
            Error::DuplicateSlug(slug.clone())
        } else {
            Error::from(e)
        }
    })?;

    tracing::info!(%id, slug = %slug, "Registered organization");

    get_by_id(pool, id).await
}

/// Load organization by id
pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<Organization> {
    let query = format!("SELECT {} FROM organizations WHERE id = ?", ORGANIZATION_COLUMNS);
    let row = sqlx::query(&query)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => row_to_organization(&row),
        None => Err(Error::NotFound(format!("organization {}", id))),
    }
}

/// Load organization by slug
pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> Result<Organization> {
    let query = format!("SELECT {} FROM organizations WHERE slug = ?", ORGANIZATION_COLUMNS);
    let row = sqlx::query(&query).bind(slug).fetch_optional(pool).await?;

    match row {
        Some(row) => row_to_organization(&row),
        None => Err(Error::NotFound(format!("organization '{}'", slug))),
    }
}

/// List all organizations, worst score first
///
/// Ties resolve by report count, then insertion order, so the listing is
/// deterministic.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Organization>> {
    let query = format!(
        "SELECT {} FROM organizations
         ORDER BY sketch_score DESC, total_reports DESC, rowid ASC",
        ORGANIZATION_COLUMNS
    );
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    rows.iter().map(row_to_organization).collect()
}

/// Search organizations by case-insensitive substring on name, industry, or
/// location
pub async fn search(pool: &SqlitePool, term: &str) -> Result<Vec<Organization>> {
    let pattern = format!("%{}%", term);
    let query = format!(
        "SELECT {} FROM organizations
         WHERE name LIKE ? OR industry LIKE ? OR location LIKE ?
         ORDER BY sketch_score DESC, total_reports DESC, rowid ASC",
        ORGANIZATION_COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_organization).collect()
}

/// Write a recomputed score back to the registry.
///
/// Only the scoring engine calls this; the score fields have no other write
/// path.
pub(crate) async fn apply_score(
    conn: &mut SqliteConnection,
    id: Uuid,
    score: i64,
    count: i64,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE organizations
        SET sketch_score = ?, total_reports = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(score)
    .bind(count)
    .bind(id.to_string())
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("organization {}", id)));
    }

    Ok(())
}
