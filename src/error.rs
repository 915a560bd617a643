use thiserror::Error;

/// Error taxonomy for every upstream market-data call.
///
/// Retry and fallback decisions are made on the variant, never on message
/// text, so the classes here are the contract: `Offline` and 4xx failures
/// fail fast, `RateLimited` waits out the server window, 5xx and `Unknown`
/// are transient and retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("no internet connection")]
    Offline,
    #[error("too many requests")]
    RateLimited { retry_after: Option<u64> },
    #[error("server error ({status})")]
    Server { status: u16 },
    #[error("failed to parse server response")]
    Decoding,
    #[error("unexpected error")]
    Unknown,
}

impl NetworkError {
    /// Transient failures worth replaying: 5xx and unclassified errors.
    /// Rate limiting is handled separately by the retry loop.
    pub fn is_transient(&self) -> bool {
        match self {
            NetworkError::Server { status } => (500..=599).contains(status),
            NetworkError::Unknown => true,
            _ => false,
        }
    }
}
