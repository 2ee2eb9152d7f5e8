use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::Mailer;
use crate::storage::ScreenshotStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub screenshots: Arc<dyn ScreenshotStore>,
    pub mailer: Option<Arc<Mailer>>,
}
