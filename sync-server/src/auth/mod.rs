//! Inbound API-key authentication
//!
//! Every CRM/fulfillment route requires the shared key in the
//! `X-CRM-API-Key` header. Comparison is constant-time; a missing header
//! is 401, a mismatch 403, and a server without a configured key answers
//! 500 so misconfiguration is never mistaken for a bad client key.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use ring::constant_time::verify_slices_are_equal;

use shared::error::{AppError, ErrorCode};

use crate::core::ServerState;

/// Header carrying the inbound shared secret
pub const API_KEY_HEADER: &str = "X-CRM-API-Key";

/// Axum middleware enforcing the inbound API key
pub async fn require_api_key(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::MissingApiKey,
                format!("Missing {} header", API_KEY_HEADER),
            )
        })?;

    let expected = state.config.inbound_api_key.as_deref().ok_or_else(|| {
        tracing::error!("INBOUND_API_KEY not configured");
        AppError::new(ErrorCode::ApiKeyNotConfigured)
    })?;

    if verify_slices_are_equal(expected.as_bytes(), provided.as_bytes()).is_err() {
        tracing::warn!(
            provided_key_length = provided.len(),
            "Invalid API key attempt"
        );
        return Err(AppError::new(ErrorCode::InvalidApiKey));
    }

    Ok(next.run(request).await)
}
