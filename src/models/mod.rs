pub mod alert;
pub mod market;

use serde::Serialize;

/// JSON error body shared by every handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
