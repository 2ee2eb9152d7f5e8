use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::db;
use crate::error::AppError;
use crate::models::screenshot_token::TOKEN_TTL_HOURS;
use crate::state::SharedState;
use crate::storage::{content_type_for, screenshot_key, StoreError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub screenshot_url: Option<String>,
    pub user_email: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{name} is required"))),
    }
}

/// Mint a fresh single-use access token for a stored screenshot.
pub async fn issue(
    State(state): State<SharedState>,
    Json(request): Json<IssueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let screenshot_url = required(request.screenshot_url, "screenshotUrl")?;
    let user_email = required(request.user_email, "userEmail")?;

    let token = hex::encode(rand::random::<[u8; 32]>());
    let created_at = Utc::now();
    let expires_at = created_at + Duration::hours(TOKEN_TTL_HOURS);

    db::screenshot_tokens::create(
        &state.pool,
        &token,
        &screenshot_url,
        &user_email,
        created_at,
        expires_at,
    )
    .await?;
    tracing::info!(%user_email, "screenshot access token issued");

    let secure_url = format!(
        "{}/api/v1/screenshots/access?token={token}",
        state.config.base_url
    );
    Ok(Json(json!({
        "secureUrl": secure_url,
        "expiresAt": expires_at.to_rfc3339(),
    })))
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub token: Option<String>,
}

/// Exchange a token for the screenshot bytes. The token is consumed
/// up front, so it is spent even when the fetch afterwards fails.
pub async fn resolve(
    State(state): State<SharedState>,
    Query(query): Query<ResolveQuery>,
) -> Result<impl IntoResponse, AppError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Token required".to_string()))?;

    let record = db::screenshot_tokens::take(&state.pool, &token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    if record.is_expired(Utc::now()) {
        tracing::info!("rejected expired screenshot token");
        return Err(AppError::Unauthorized("Token expired".to_string()));
    }

    let key = screenshot_key(&record.screenshot_url).ok_or_else(|| {
        AppError::Validation("Invalid screenshot reference".to_string())
    })?;

    let data = state.screenshots.download(key).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("Screenshot not found".to_string()),
        StoreError::Backend(msg) => AppError::Backend(msg),
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(key)),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));

    Ok((StatusCode::OK, headers, data))
}
