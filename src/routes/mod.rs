pub mod notifications;
pub mod screenshots;
pub mod submissions;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    // The token and notification endpoints are called from browser
    // contexts on other origins, so they get permissive CORS.
    let public = Router::new()
        .route(
            "/api/v1/screenshots/access",
            post(screenshots::issue).get(screenshots::resolve),
        )
        .route(
            "/api/v1/notifications/submission-copy",
            post(notifications::submission_copy),
        )
        .layer(CorsLayer::permissive());

    Router::new()
        .route(
            "/api/v1/submissions",
            post(submissions::create).get(submissions::list),
        )
        .route("/api/v1/submissions/export", get(submissions::export))
        .route("/api/v1/submissions/stats", get(submissions::stats))
        .route(
            "/api/v1/submissions/{id}",
            get(submissions::get_one).delete(submissions::delete),
        )
        .merge(public)
}
