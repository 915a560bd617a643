use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::error::NetworkError;
use crate::network::backoff::{NetworkBackoff, NetworkThrottle};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for one provider endpoint.
///
/// Every dispatch first waits out the shared rate-limit suspension window,
/// then the shared minimum-spacing throttle. A 429 response extends the
/// suspension window for the whole process before surfacing as
/// `RateLimited`.
///
/// When a distinct fallback base URL is configured for the same provider,
/// a first attempt failing with a rate limit or 401/403/429 is replayed
/// once against it.
#[derive(Clone)]
pub struct NetworkClient {
    http: reqwest::Client,
    base_url: String,
    fallback_base_url: Option<String>,
    backoff: Arc<NetworkBackoff>,
    throttle: Arc<NetworkThrottle>,
}

impl NetworkClient {
    pub fn new(
        base_url: String,
        fallback_base_url: Option<String>,
        api_key_header: Option<(&'static str, String)>,
        backoff: Arc<NetworkBackoff>,
        throttle: Arc<NetworkThrottle>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));
        if let Some((name, key)) = api_key_header {
            if !key.is_empty() {
                if let Ok(value) = HeaderValue::from_str(&key) {
                    headers.insert(name, value);
                }
            }
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url,
            fallback_base_url,
            backoff,
            throttle,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NetworkError> {
        self.backoff.wait_if_needed().await;
        self.throttle.throttle().await;

        match self.request_once(&self.base_url, path, query).await {
            Ok(value) => Ok(value),
            Err(error) => {
                let Some(fallback) = &self.fallback_base_url else {
                    return Err(error);
                };
                if !Self::should_failover(&error) {
                    return Err(error);
                }
                tracing::warn!(
                    "Primary endpoint failed with {error}, retrying against {fallback}{path}"
                );
                // The alternate endpoint is still one more outgoing
                // request: it waits on the same gates.
                self.backoff.wait_if_needed().await;
                self.throttle.throttle().await;
                self.request_once(fallback, path, query).await
            }
        }
    }

    async fn request_once<T: DeserializeOwned>(
        &self,
        base_url: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NetworkError> {
        let url = format!("{base_url}{path}");
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|error| {
                if error.is_connect() {
                    NetworkError::Offline
                } else {
                    // Timeouts and everything else classify as transient.
                    NetworkError::Unknown
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok());
            self.backoff
                .suspend_for(retry_after.unwrap_or(NetworkBackoff::DEFAULT_SUSPENSION_SECS));
            return Err(NetworkError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(NetworkError::Server {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|_| NetworkError::Decoding)
    }

    fn should_failover(error: &NetworkError) -> bool {
        match error {
            NetworkError::RateLimited { .. } => true,
            NetworkError::Server { status } => matches!(status, 401 | 403 | 429),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failover_classes() {
        assert!(NetworkClient::should_failover(&NetworkError::RateLimited {
            retry_after: None
        }));
        assert!(NetworkClient::should_failover(&NetworkError::Server {
            status: 401
        }));
        assert!(NetworkClient::should_failover(&NetworkError::Server {
            status: 403
        }));
        assert!(!NetworkClient::should_failover(&NetworkError::Server {
            status: 500
        }));
        assert!(!NetworkClient::should_failover(&NetworkError::Offline));
        assert!(!NetworkClient::should_failover(&NetworkError::Decoding));
    }
}
