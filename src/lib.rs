pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod mapper;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;
pub mod submission;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use sqlx::PgPool;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;
use crate::email::Mailer;
use crate::state::AppState;
use crate::storage::ScreenshotStore;

async fn health() -> &'static str {
    "ok"
}

pub fn build_app(
    pool: PgPool,
    screenshots: Arc<dyn ScreenshotStore>,
    config: Config,
) -> Router {
    let mailer = match &config.smtp {
        Some(smtp) => match Mailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!(host = %smtp.host, "email dispatch enabled");
                Some(Arc::new(mailer))
            }
            Err(e) => {
                tracing::warn!(error = %e, "email dispatch disabled");
                None
            }
        },
        None => {
            tracing::info!("SMTP not configured, email dispatch disabled");
            None
        }
    };

    let max_body_size = config.max_body_size;
    let state = Arc::new(AppState {
        pool,
        config,
        screenshots,
        mailer,
    });

    Router::new()
        .merge(routes::api_routes())
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}
