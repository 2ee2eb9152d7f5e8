use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::SharedState;

/// Extractor gating the admin review endpoints behind the configured
/// bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing admin token".to_string()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Missing admin token".to_string()))?;

        if bool::from(token.as_bytes().ct_eq(state.config.admin_token.as_bytes())) {
            Ok(AdminUser)
        } else {
            Err(AppError::Unauthorized("Invalid admin token".to_string()))
        }
    }
}
