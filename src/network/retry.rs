use std::future::Future;
use std::time::Duration;

use crate::error::NetworkError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(600);
const DELAY_MULTIPLIER: f64 = 1.6;

/// Bounded-attempt retry with exponential delay.
///
/// Rate-limit failures wait out `max(server retry-after, current delay)`
/// and replay without consuming transient-retry eligibility checks; 5xx
/// and unclassified errors back off and replay while attempts remain;
/// every other class fails immediately. The last error is re-raised
/// unchanged on exhaustion.
pub async fn run<T, F, Fut>(
    max_attempts: u32,
    initial_delay: Duration,
    operation: F,
) -> Result<T, NetworkError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, NetworkError>>,
{
    let mut attempt = 0;
    let mut delay = initial_delay;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(error);
                }
                if let NetworkError::RateLimited { retry_after } = &error {
                    let wait = retry_after
                        .map(Duration::from_secs)
                        .unwrap_or(delay)
                        .max(delay);
                    tokio::time::sleep(wait).await;
                    delay = delay.mul_f64(DELAY_MULTIPLIER);
                    continue;
                }
                if !error.is_transient() {
                    return Err(error);
                }
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(DELAY_MULTIPLIER);
            }
        }
    }
}

/// `run` with the default attempt count and initial delay.
pub async fn run_default<T, F, Fut>(operation: F) -> Result<T, NetworkError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, NetworkError>>,
{
    run(DEFAULT_MAX_ATTEMPTS, DEFAULT_INITIAL_DELAY, operation).await
}
