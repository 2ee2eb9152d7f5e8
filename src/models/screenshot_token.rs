use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fixed token lifetime.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ScreenshotToken {
    pub token: String,
    pub screenshot_url: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ScreenshotToken {
    /// A token is valid iff it still exists in the store and strictly
    /// less than the TTL has elapsed since issuance.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::hours(TOKEN_TTL_HOURS)
    }
}
