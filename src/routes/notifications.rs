use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    pub form_data: Option<Value>,
    pub user_email: Option<String>,
}

/// Send the submitter a copy of their record on demand.
pub async fn submission_copy(
    State(state): State<SharedState>,
    Json(request): Json<CopyRequest>,
) -> Result<Json<Value>, AppError> {
    let form_data = request
        .form_data
        .filter(Value::is_object)
        .ok_or_else(|| AppError::Validation("formData is required".to_string()))?;
    let user_email = request
        .user_email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::Validation("userEmail is required".to_string()))?;

    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| AppError::Configuration("SMTP not configured".to_string()))?;
    mailer
        .send_submission_copy(&user_email, &form_data)
        .await
        .map_err(AppError::Backend)?;

    tracing::info!(%user_email, "submission copy sent");
    Ok(Json(json!({ "success": true })))
}
