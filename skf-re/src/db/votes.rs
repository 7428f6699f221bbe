//! Vote tally database operations
//!
//! One vote per voter per report, latest direction wins. The upsert, the
//! tally recount, and the mirrored counter on the report row share one
//! transaction.

use skf_common::db::models::VoteDirection;
use skf_common::{Error, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Current up/down totals for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// Cast or replace a vote on a report.
///
/// Returns the report's tally after the vote. A voter flipping direction
/// moves their vote between buckets; it is never counted twice.
pub async fn cast_vote(
    pool: &SqlitePool,
    report_id: Uuid,
    voter_id: Uuid,
    direction: VoteDirection,
) -> Result<VoteTally> {
    let report_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reports WHERE id = ?)")
        .bind(report_id.to_string())
        .fetch_one(pool)
        .await?;

    if !report_exists {
        return Err(Error::NotFound(format!("report {}", report_id)));
    }

    // Upsert first so the transaction opens with its write
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO report_votes (id, report_id, user_id, vote_type)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(report_id, user_id) DO UPDATE SET
            vote_type = excluded.vote_type,
            created_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(report_id.to_string())
    .bind(voter_id.to_string())
    .bind(direction.as_str())
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN vote_type = 'up' THEN 1 ELSE 0 END), 0) AS upvotes,
            COALESCE(SUM(CASE WHEN vote_type = 'down' THEN 1 ELSE 0 END), 0) AS downvotes
        FROM report_votes
        WHERE report_id = ?
        "#,
    )
    .bind(report_id.to_string())
    .fetch_one(&mut *tx)
    .await?;

    let tally = VoteTally {
        upvotes: row.get("upvotes"),
        downvotes: row.get("downvotes"),
    };

    // Mirror the up-count onto the report row for ranking reads
    sqlx::query("UPDATE reports SET upvotes = ? WHERE id = ?")
        .bind(tally.upvotes)
        .bind(report_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(
        report_id = %report_id,
        voter_id = %voter_id,
        direction = direction.as_str(),
        upvotes = tally.upvotes,
        downvotes = tally.downvotes,
        "Vote recorded"
    );

    Ok(tally)
}

/// Read a report's current tally without casting a vote
pub async fn tally(pool: &SqlitePool, report_id: Uuid) -> Result<VoteTally> {
    let row = sqlx::query(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN vote_type = 'up' THEN 1 ELSE 0 END), 0) AS upvotes,
            COALESCE(SUM(CASE WHEN vote_type = 'down' THEN 1 ELSE 0 END), 0) AS downvotes
        FROM report_votes
        WHERE report_id = ?
        "#,
    )
    .bind(report_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(VoteTally {
        upvotes: row.get("upvotes"),
        downvotes: row.get("downvotes"),
    })
}
