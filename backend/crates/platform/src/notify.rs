//! Notification dispatch
//!
//! Domain operations emit [`Notification`]s after their state change is
//! durable. Delivery is best-effort: [`dispatch_detached`] runs the notifier on
//! a detached task and only logs a failure, so the triggering operation never
//! waits for, or fails because of, delivery.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

/// Domain events that produce a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    IdentityRegistered,
    EnrollmentRequested,
    EnrollmentAccepted,
    EnrollmentRejected,
    PasswordResetRequested,
    PasswordChanged,
}

impl NotificationEvent {
    /// Stable event code, used by downstream templating
    pub fn code(&self) -> &'static str {
        match self {
            Self::IdentityRegistered => "IDENTITY_REGISTERED",
            Self::EnrollmentRequested => "ENROLLMENT_REQUESTED",
            Self::EnrollmentAccepted => "ENROLLMENT_ACCEPTED",
            Self::EnrollmentRejected => "ENROLLMENT_REJECTED",
            Self::PasswordResetRequested => "PASSWORD_RESET_REQUESTED",
            Self::PasswordChanged => "PASSWORD_CHANGED",
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A message addressed to one identity
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub event: NotificationEvent,
    pub recipient_id: uuid::Uuid,
    pub recipient_email: String,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(
        event: NotificationEvent,
        recipient_id: uuid::Uuid,
        recipient_email: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event,
            recipient_id,
            recipient_email: recipient_email.into(),
            payload,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Notification could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Delivery channel for notifications
#[trait_variant::make(Notifier: Send)]
pub trait LocalNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Send a notification on a detached task
///
/// Failures are logged at `warn` and otherwise dropped.
pub fn dispatch_detached<N>(notifier: Arc<N>, notification: Notification)
where
    N: Notifier + Send + Sync + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&notification).await {
            tracing::warn!(
                event = %notification.event,
                recipient_id = %notification.recipient_id,
                error = %e,
                "Failed to deliver notification"
            );
        }
    });
}

// ============================================================================
// Implementations
// ============================================================================

/// Writes one structured log line per notification
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(&notification.payload)?;
        tracing::info!(
            event = %notification.event,
            recipient_id = %notification.recipient_id,
            payload = %payload,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Records notifications in memory
///
/// Clones share the same record, so a test can keep one handle while the
/// code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails (nothing is recorded)
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            failing: true,
        }
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    /// Wait until at least `count` notifications were recorded
    ///
    /// Returns everything recorded so far once the count is reached or the
    /// timeout elapses, whichever comes first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent().await;
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Notifier for MemoryNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.failing {
            return Err(NotifyError::Delivery("mail relay unavailable".into()));
        }
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}
