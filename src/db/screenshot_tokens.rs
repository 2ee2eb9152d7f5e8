use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::ScreenshotToken;

pub async fn create(
    pool: &PgPool,
    token: &str,
    screenshot_url: &str,
    user_email: &str,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<ScreenshotToken, sqlx::Error> {
    sqlx::query_as::<_, ScreenshotToken>(
        "INSERT INTO _secure_screenshot_tokens (token, screenshot_url, user_email, created_at, expires_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(token)
    .bind(screenshot_url)
    .bind(user_email)
    .bind(created_at)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Atomically remove and return the token record, if present. Single
/// statement, so of two concurrent resolves exactly one sees the row;
/// the loser gets `None`. Consumption happens here regardless of
/// whether the subsequent content fetch succeeds.
pub async fn take(pool: &PgPool, token: &str) -> Result<Option<ScreenshotToken>, sqlx::Error> {
    sqlx::query_as::<_, ScreenshotToken>(
        "DELETE FROM _secure_screenshot_tokens WHERE token = $1 RETURNING *",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}
