//! Report ledger database operations
//!
//! Reports are append-only: nothing updates or deletes a report after
//! creation except the vote counter owned by the vote tally. Submitting a
//! report and recomputing the organization's score happen inside one
//! transaction, so readers never observe one without the other.

use skf_common::db::models::{Category, Report};
use skf_common::{Error, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::scoring;

/// Fields accepted when submitting a report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub title: String,
    pub body: String,
    pub severity: i64,
    pub is_anonymous: bool,
}

/// Report as presented to readers
///
/// The stored submitter reference is projected down to a display label here;
/// it never reaches the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub category: Category,
    pub title: String,
    pub body: String,
    pub severity: i64,
    pub is_anonymous: bool,
    pub upvotes: i64,
    pub created_at: String,
    pub author_name: String,
}

/// Count of reports in one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: i64,
}

fn row_to_report(row: &sqlx::sqlite::SqliteRow) -> Result<Report> {
    let id: String = row.get("id");
    let organization_id: String = row.get("organization_id");
    let user_id: String = row.get("user_id");
    let category: String = row.get("category");
    let is_anonymous: i64 = row.get("is_anonymous");

    Ok(Report {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
        organization_id: Uuid::parse_str(&organization_id)
            .map_err(|e| Error::Internal(e.to_string()))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| Error::Internal(e.to_string()))?,
        category: category.parse()?,
        title: row.get("title"),
        body: row.get("body"),
        severity: row.get("severity"),
        is_anonymous: is_anonymous != 0,
        upvotes: row.get("upvotes"),
        created_at: row.get("created_at"),
    })
}

/// Submit a report against an organization.
///
/// All validation happens before any write. The insert and the score
/// recompute share one transaction: by the time this returns, the
/// organization's score reflects the new report, and a recompute failure
/// rolls the insert back.
pub async fn submit(pool: &SqlitePool, new: NewReport) -> Result<Report> {
    let category: Category = new.category.parse()?;

    if new.title.trim().is_empty() {
        return Err(Error::InvalidInput("report title is required".to_string()));
    }
    if new.body.trim().is_empty() {
        return Err(Error::InvalidInput("report body is required".to_string()));
    }
    if !(1..=5).contains(&new.severity) {
        return Err(Error::InvalidInput(format!(
            "severity must be between 1 and 5, got {}",
            new.severity
        )));
    }

    let organization_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organizations WHERE id = ?)")
            .bind(new.organization_id.to_string())
            .fetch_one(pool)
            .await?;

    if !organization_exists {
        return Err(Error::NotFound(format!("organization {}", new.organization_id)));
    }

    let id = Uuid::new_v4();

    // The transaction must open with the write: the insert takes the writer
    // slot before any read, so concurrent submissions to one organization
    // serialize and each recompute sees the prior commit.
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO reports (id, organization_id, user_id, category, title, body, severity, is_anonymous)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(new.organization_id.to_string())
    .bind(new.user_id.to_string())
    .bind(category.as_str())
    .bind(&new.title)
    .bind(&new.body)
    .bind(new.severity)
    .bind(new.is_anonymous as i64)
    .execute(&mut *tx)
    .await?;

    scoring::recompute(&mut *tx, new.organization_id).await?;

    let row = sqlx::query("SELECT * FROM reports WHERE id = ?")
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await?;
    let report = row_to_report(&row)?;

    tx.commit().await?;

    tracing::info!(
        report_id = %id,
        organization_id = %new.organization_id,
        severity = new.severity,
        "Report submitted"
    );

    Ok(report)
}

/// Load a report by id
pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<Report> {
    let row = sqlx::query("SELECT * FROM reports WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => row_to_report(&row),
        None => Err(Error::NotFound(format!("report {}", id))),
    }
}

/// List an organization's reports, newest first, optionally filtered by
/// category.
///
/// The displayed author is "Anonymous" when the report's anonymity flag is
/// set, otherwise the submitter's display name. The substitution happens in
/// the query; stored data is untouched.
pub async fn list_by_organization(
    pool: &SqlitePool,
    organization_id: Uuid,
    category: Option<Category>,
) -> Result<Vec<ReportView>> {
    let base = r#"
        SELECT r.id, r.organization_id, r.category, r.title, r.body, r.severity,
               r.is_anonymous, r.upvotes, r.created_at,
               CASE WHEN r.is_anonymous = 1 THEN 'Anonymous'
                    ELSE COALESCE(u.name, 'Anonymous')
               END AS author_name
        FROM reports r
        LEFT JOIN users u ON r.user_id = u.id
        WHERE r.organization_id = ?
    "#;

    let rows = match category {
        Some(category) => {
            let query = format!("{} AND r.category = ? ORDER BY r.created_at DESC, r.rowid DESC", base);
            sqlx::query(&query)
                .bind(organization_id.to_string())
                .bind(category.as_str())
                .fetch_all(pool)
                .await?
        }
        None => {
            let query = format!("{} ORDER BY r.created_at DESC, r.rowid DESC", base);
            sqlx::query(&query)
                .bind(organization_id.to_string())
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter()
        .map(|row| {
            let id: String = row.get("id");
            let organization_id: String = row.get("organization_id");
            let category: String = row.get("category");
            let is_anonymous: i64 = row.get("is_anonymous");

            Ok(ReportView {
                id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
                organization_id: Uuid::parse_str(&organization_id)
                    .map_err(|e| Error::Internal(e.to_string()))?,
                category: category.parse()?,
                title: row.get("title"),
                body: row.get("body"),
                severity: row.get("severity"),
                is_anonymous: is_anonymous != 0,
                upvotes: row.get("upvotes"),
                created_at: row.get("created_at"),
                author_name: row.get("author_name"),
            })
        })
        .collect()
}

/// Count reports per category for an organization.
///
/// Only categories that are present appear; sorted by count descending, then
/// category name for determinism.
pub async fn category_breakdown(
    pool: &SqlitePool,
    organization_id: Uuid,
) -> Result<Vec<CategoryCount>> {
    let rows = sqlx::query(
        r#"
        SELECT category, COUNT(*) AS count
        FROM reports
        WHERE organization_id = ?
        GROUP BY category
        ORDER BY count DESC, category ASC
        "#,
    )
    .bind(organization_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let category: String = row.get("category");
            Ok(CategoryCount {
                category: category.parse()?,
                count: row.get("count"),
            })
        })
        .collect()
}
