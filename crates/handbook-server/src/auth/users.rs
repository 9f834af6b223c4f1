use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;

use super::{hash_password, verify_password};

pub async fn create_user(db: &DbPool, username: &str, password: &str) -> Result<Uuid, AppError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(password)?;
    let user_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(username)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(user_id)
}

/// Checks the credentials and records the login. Unknown users and wrong
/// passwords are indistinguishable to the caller.
pub async fn authenticate(db: &DbPool, username: &str, password: &str) -> Result<Uuid, AppError> {
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(db)
            .await?;

    let (user_id, password_hash) = row.ok_or(AppError::Unauthorized)?;

    if !verify_password(password, &password_hash)? {
        return Err(AppError::Unauthorized);
    }

    sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(user_id)
}

/// Creates the configured admin account on first start.
pub async fn ensure_admin(db: &DbPool, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        tracing::debug!("No admin credentials configured; skipping bootstrap");
        return Ok(());
    };

    match create_user(db, username, password).await {
        Ok(_) => {
            tracing::info!("Created admin user '{}'", username);
            Ok(())
        }
        Err(AppError::Conflict(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
