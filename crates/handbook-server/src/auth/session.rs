use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;

use super::AuthUser;

const TOKEN_LEN: usize = 48;

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Creates a session for `user_id` that expires after `ttl_secs`.
pub async fn issue_token(db: &DbPool, user_id: Uuid, ttl_secs: i64) -> Result<String, AppError> {
    let token = generate_token();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(ttl_secs);

    purge_expired(db).await?;
    sqlx::query(
        r#"
        INSERT INTO sessions (token, user_id, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&token)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .execute(db)
    .await?;

    Ok(token)
}

/// Resolves a bearer token to its user. Expired sessions are deleted.
pub async fn verify_token(db: &DbPool, token: &str) -> Result<AuthUser, AppError> {
    let row: Option<(Uuid, String, DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT u.id, u.username, s.expires_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    let (id, username, expires_at) = row.ok_or(AppError::Unauthorized)?;

    if expires_at <= Utc::now() {
        tracing::debug!("Session for {} expired at {}", username, expires_at);
        revoke(db, token).await?;
        return Err(AppError::Unauthorized);
    }

    Ok(AuthUser { id, username })
}

pub async fn revoke(db: &DbPool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

/// Deletes every session past its expiry. Returns the number removed.
pub async fn purge_expired(db: &DbPool) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
