use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A message the engine wants delivered. Rendering is the collaborator's
/// problem; the engine only decides whether to send and with what context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub recipients: Vec<String>,
    pub subject: String,
    pub template_key: String,
    pub context: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Sender that records deliveries on the log stream instead of dispatching
/// them anywhere. Used for local wiring and tests.
pub struct TracingSender;

#[async_trait]
impl NotificationSender for TracingSender {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            subject = %notification.subject,
            template = %notification.template_key,
            recipients = ?notification.recipients,
            "notification dispatched"
        );
        Ok(())
    }
}
