use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Process-wide suspension window shared by every outgoing request.
///
/// A 429 from the provider suspends all traffic until the deadline passes.
/// The deadline only ever extends (`suspend_for` never shortens an existing
/// window), so overlapping rate-limit responses cannot race it backwards.
pub struct NetworkBackoff {
    suspended_until: Mutex<Option<Instant>>,
}

impl NetworkBackoff {
    pub const DEFAULT_SUSPENSION_SECS: u64 = 60;

    pub fn new() -> Self {
        Self {
            suspended_until: Mutex::new(None),
        }
    }

    /// Sleeps until the current suspension window has passed. No-op when
    /// no window is active.
    pub async fn wait_if_needed(&self) {
        let deadline = *self.suspended_until.lock();
        if let Some(until) = deadline {
            if until > Instant::now() {
                tokio::time::sleep_until(until).await;
            }
        }
    }

    pub fn suspend_for(&self, seconds: u64) {
        let new_until = Instant::now() + Duration::from_secs(seconds);
        let mut guard = self.suspended_until.lock();
        match *guard {
            Some(existing) if existing > new_until => {}
            _ => *guard = Some(new_until),
        }
    }

    #[cfg(test)]
    fn suspended_until(&self) -> Option<Instant> {
        *self.suspended_until.lock()
    }
}

impl Default for NetworkBackoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimum spacing between consecutive dispatches.
///
/// The lock is held across the sleep on purpose: concurrent callers queue
/// up behind it and leave the wire one interval apart.
pub struct NetworkThrottle {
    min_interval: Duration,
    last_request: tokio::sync::Mutex<Option<Instant>>,
}

impl NetworkThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: tokio::sync::Mutex::new(None),
        }
    }

    pub async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn suspension_extends_monotonically() {
        let backoff = NetworkBackoff::new();
        backoff.suspend_for(60);
        let first = backoff.suspended_until().unwrap();

        // A shorter window must not pull the deadline forward.
        backoff.suspend_for(10);
        assert_eq!(backoff.suspended_until().unwrap(), first);

        // A longer one pushes it out.
        backoff.suspend_for(120);
        assert!(backoff.suspended_until().unwrap() > first);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_blocks_until_window_passes() {
        let backoff = NetworkBackoff::new();
        backoff.suspend_for(30);
        let started = Instant::now();
        backoff.wait_if_needed().await;
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_immediately_without_window() {
        let backoff = NetworkBackoff::new();
        let started = Instant::now();
        backoff.wait_if_needed().await;
        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_spaces_out_consecutive_calls() {
        let throttle = NetworkThrottle::new(Duration::from_secs(2));
        throttle.throttle().await;
        let started = Instant::now();
        throttle.throttle().await;
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
