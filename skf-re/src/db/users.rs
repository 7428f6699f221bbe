//! Identity record database operations

use skf_common::db::models::User;
use skf_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Fields accepted when creating an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub password_salt: String,
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let id: String = row.get("id");
    let totp_enabled: i64 = row.get("totp_enabled");

    Ok(User {
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
    })
}

/// Create a new account
pub async fn create_user(pool: &SqlitePool, new: NewUser) -> Result<User> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, password_salt)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&new.email)
    .bind(&new.name)
    .bind(&new.password_hash)
    .bind(&new.password_salt)
    .execute(pool)
    .await
    .map_err(|e| {
        if e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false) {
            Error::InvalidInput("an account with this email already exists".to_string())
        } else {
            Error::from(e)
        }
    })?;

    get_by_id(pool, id).await
}

/// Load account by email
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(row_to_user(&row)?)),
        None => Ok(None),
    }
}

/// Load account by id
pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<User> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => row_to_user(&row),
        None => Err(Error::NotFound(format!("user {}", id))),
    }
}

/// Store a second-factor secret and its enabled flag
pub async fn update_totp(
    pool: &SqlitePool,
    user_id: Uuid,
    secret: Option<&str>,
    enabled: bool,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET totp_secret = ?, totp_enabled = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(secret)
    .bind(enabled as i64)
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }

    Ok(())
}
