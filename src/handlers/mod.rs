pub mod alerts;
pub mod coins;
pub mod markets;
pub mod user_data;

use axum::http::StatusCode;
use axum::Json;

use crate::error::NetworkError;
use crate::models::ErrorResponse;

/// Maps a refresh failure to an HTTP status for the caller.
pub(crate) fn error_response(error: &NetworkError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match error {
        NetworkError::Offline => StatusCode::SERVICE_UNAVAILABLE,
        NetworkError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        NetworkError::Server { .. } | NetworkError::Decoding => StatusCode::BAD_GATEWAY,
        NetworkError::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// Whether a failed refresh may be answered with non-empty cached data
/// instead of an error: connectivity loss, rate limiting, and the
/// plan-limit 400 all qualify.
pub(crate) fn can_serve_stale(error: &NetworkError) -> bool {
    matches!(
        error,
        NetworkError::Offline
            | NetworkError::RateLimited { .. }
            | NetworkError::Server { status: 400 }
    )
}
