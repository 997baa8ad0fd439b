use chrono::{DateTime, Utc};

use crate::models::PasswordResetToken;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<PasswordResetToken, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetToken>(
        "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

/// Mark every outstanding token of the user as used. Returns how many were revoked.
pub async fn invalidate_for_user<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE password_reset_tokens SET used = true WHERE user_id = $1 AND used = false",
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Fetch and row-lock an unused, unexpired token. A concurrent redeemer
/// blocks here and then sees no row once the first one commits.
pub async fn lock_valid_by_hash<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token_hash: &str,
) -> Result<Option<PasswordResetToken>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetToken>(
        "SELECT * FROM password_reset_tokens
         WHERE token_hash = $1 AND used = false AND expires_at > now()
         FOR UPDATE",
    )
    .bind(token_hash)
    .fetch_optional(executor)
    .await
}

/// Returns false when the token was already used.
pub async fn mark_used<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE password_reset_tokens SET used = true WHERE id = $1 AND used = false")
            .bind(id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() == 1)
}
