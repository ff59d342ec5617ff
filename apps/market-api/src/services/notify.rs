//! Notification boundary.
//!
//! Outbound delivery (SMTP, push, etc.) is an external collaborator; this
//! module only defines the seam and a tracing-backed default. The one rule
//! every caller follows: a failed notification is logged and swallowed,
//! never escalated to fail the business operation that triggered it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

/// Notification delivery failure.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// The notification seam.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends a notification to `to`.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Default sender: records the notification in the service log.
///
/// Stands in for real delivery in development and keeps the call sites
/// honest about the best-effort contract.
pub struct TracingNotificationSender;

#[async_trait]
impl NotificationSender for TracingNotificationSender {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        info!(to = %to, subject = %subject, "Notification dispatched");
        Ok(())
    }
}

/// Sends best-effort: delivery failures are logged at WARN and dropped.
///
/// ## Usage
/// ```rust,ignore
/// notify_best_effort(&*self.notifier, &customer.email, "Order confirmation", &body).await;
/// // checkout continues regardless
/// ```
pub async fn notify_best_effort(
    sender: &dyn NotificationSender,
    to: &str,
    subject: &str,
    body: &str,
) {
    if let Err(e) = sender.send(to, subject, body).await {
        warn!(to = %to, subject = %subject, error = %e, "Notification failed; continuing");
    }
}

// =============================================================================
// Test Double
// =============================================================================
