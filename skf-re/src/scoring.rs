//! Sketch score computation
//!
//! The sketch score is a 0-100 aggregate derived from the severities of an
//! organization's full report set. Every recompute re-reads the entire set
//! rather than maintaining a running accumulator, so the stored score can
//! never drift from the ledger even after out-of-band data changes.
//!
//! `recompute` must run on the same connection (transaction) as the report
//! insert that triggered it, so its read of the report set is consistent
//! with its own write.

use skf_common::Result;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::organizations;

/// Compute (sketch_score, total_reports) from a report severity set.
///
/// Score is `round(mean(severity) * 20)`; severity is 1-5, so the result is
/// 20-100 for a non-empty set and 0 for an empty one.
pub fn sketch_score(severities: &[i64]) -> (i64, i64) {
    if severities.is_empty() {
        return (0, 0);
    }

    let sum: i64 = severities.iter().sum();
    let mean = sum as f64 / severities.len() as f64;
    let score = (mean * 20.0).round() as i64;

    (score, severities.len() as i64)
}

/// Recompute an organization's score from its current report set and write
/// it back to the registry.
pub async fn recompute(conn: &mut SqliteConnection, organization_id: Uuid) -> Result<(i64, i64)> {
    let severities: Vec<i64> =
        sqlx::query_scalar("SELECT severity FROM reports WHERE organization_id = ?")
            .bind(organization_id.to_string())
            .fetch_all(&mut *conn)
            .await?;

    let (score, count) = sketch_score(&severities);
    organizations::apply_score(conn, organization_id, score, count).await?;

    tracing::debug!(
        organization_id = %organization_id,
        score,
        count,
        "Recomputed sketch score"
    );

    Ok((score, count))
}
