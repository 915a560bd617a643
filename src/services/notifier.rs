use async_trait::async_trait;

/// Delivery boundary for alert notifications: fire-and-forget,
/// at-least-once, no delivery confirmation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, title: &str, body: &str);
}

/// Default sink: writes the notification to the log stream.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, title: &str, body: &str) {
        tracing::info!("Notification: {title}: {body}");
    }
}
