use crate::error::AppError;
use crate::models::User;
use sqlx::PgPool;

const USER_COLUMNS: &str =
    "id, email, username, hashed_password, is_active, created_at, updated_at";

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = $1",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Login lookup: a single identifier resolves against username or email.
pub async fn find_by_identifier(pool: &PgPool, identifier: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = $1 OR email = $1",
        USER_COLUMNS
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn insert(
    pool: &PgPool,
    email: &str,
    username: &str,
    hashed_password: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, username, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(email)
    .bind(username)
    .bind(hashed_password)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// Flips the account gate. Outstanding tokens stay cryptographically valid;
/// the identity resolver rejects them on the next request.
pub async fn set_active(pool: &PgPool, user_id: i32, active: bool) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE users SET is_active = $1, updated_at = now() WHERE id = $2")
        .bind(active)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes a user and every todo they own, in one transaction. The schema's
/// ON DELETE CASCADE would cover the todos too; the explicit delete keeps the
/// invariant visible and atomic regardless of the storage engine.
pub async fn delete(pool: &PgPool, user_id: i32) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM todos WHERE owner_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
