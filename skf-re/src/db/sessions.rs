//! Bearer session database operations
//!
//! Sessions are opaque UUID tokens with a lifetime taken from the
//! `session_timeout_seconds` setting. Expired rows are treated as absent;
//! they are cleaned up opportunistically on logout.

use chrono::{Duration, Utc};
use skf_common::db::models::{Session, User};
use skf_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const DEFAULT_SESSION_TIMEOUT_SECONDS: i64 = 31_536_000;

/// Issue a new session for a user
pub async fn create_session(pool: &SqlitePool, user_id: Uuid) -> Result<Session> {
    let timeout = skf_common::db::setting_i64(
        pool,
        "session_timeout_seconds",
        DEFAULT_SESSION_TIMEOUT_SECONDS,
    )
    .await?;

    let token = Uuid::new_v4().to_string();
    let expires_at = (Utc::now() + Duration::seconds(timeout))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id.to_string())
        .bind(&expires_at)
        .execute(pool)
        .await?;

    let row = sqlx::query("SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?")
        .bind(&token)
        .fetch_one(pool)
        .await?;

    Ok(Session {
        id: row.get("id"),
        user_id,
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    })
}

/// Resolve a bearer token to its user, ignoring expired sessions
pub async fn find_valid(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.email, u.name, u.image, u.password_hash, u.password_salt,
               u.totp_secret, u.totp_enabled, u.created_at, u.updated_at
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.id = ? AND s.expires_at > datetime('now')
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let id: String = row.get("id");
    let totp_enabled: i64 = row.get("totp_enabled");

    Ok(Some(User {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
        email: row.get("email"),
        name: row.get("name"),
        image: row.get("image"),
        password_hash: row.get("password_hash"),
        password_salt: row.get("password_salt"),
        totp_secret: row.get("totp_secret"),
        totp_enabled: totp_enabled != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

/// Delete a session and opportunistically purge expired ones
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = ? OR expires_at <= datetime('now')")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::{create_user, NewUser};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        skf_common::db::create_all_tables(&pool)
            .await
            .expect("Schema initialization failed");

        pool
    }

    async fn test_user(pool: &SqlitePool) -> Uuid {
        create_user(
            pool,
            NewUser {
                email: "worker@example.com".to_string(),
                name: None,
                password_hash: "hash".to_string(),
                password_salt: "salt".to_string(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn session_round_trips_to_user() {
        let pool = test_pool().await;
        let user_id = test_user(&pool).await;

        let session = create_session(&pool, user_id).await.unwrap();
        let user = find_valid(&pool, &session.id).await.unwrap().expect("session not found");
        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let pool = test_pool().await;
        assert!(find_valid(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_is_treated_as_absent() {
        let pool = test_pool().await;
        let user_id = test_user(&pool).await;

        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind("stale-token")
            .bind(user_id.to_string())
            .bind("2000-01-01 00:00:00")
            .execute(&pool)
            .await
            .unwrap();

        assert!(find_valid(&pool, "stale-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleted_session_no_longer_resolves() {
        let pool = test_pool().await;
        let user_id = test_user(&pool).await;

        let session = create_session(&pool, user_id).await.unwrap();
        delete_session(&pool, &session.id).await.unwrap();
        assert!(find_valid(&pool, &session.id).await.unwrap().is_none());
    }
}
