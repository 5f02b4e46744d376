use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Guard extractor: the `Authorization` header must equal the configured token.
///
/// Place it before any body extractor so a bad token is rejected before decoding.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

impl FromRequestParts<AppState> for Authorized {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if token != state.config.token {
            warn!("rejected request to {} with invalid token", parts.uri.path());
            return Err(AppError::Unauthorized("invalid token".to_string()));
        }

        Ok(Authorized)
    }
}
