//! Best-effort notification of an identity
//!
//! The recipient's address is resolved inside the detached task, so neither
//! the lookup nor the delivery can fail the operation that triggered it.

use std::sync::Arc;

use auth::domain::repository::IdentityRepository;
use kernel::id::IdentityId;
use platform::notify::{Notification, NotificationEvent, Notifier};

pub(crate) fn notify_identity<I, N>(
    identities: Arc<I>,
    notifier: Arc<N>,
    recipient: IdentityId,
    event: NotificationEvent,
    payload: serde_json::Value,
) where
    I: IdentityRepository + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let identity = match identities.find_by_id(&recipient).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                tracing::warn!(recipient = %recipient, event = %event, "Notification recipient vanished");
                return;
            }
            Err(e) => {
                tracing::warn!(recipient = %recipient, event = %event, error = %e, "Notification recipient lookup failed");
                return;
            }
        };

        let notification =
            Notification::new(event, recipient.into_uuid(), identity.email.as_str(), payload);
        if let Err(e) = notifier.notify(&notification).await {
            tracing::warn!(
                recipient = %recipient,
                event = %event,
                error = %e,
                "Notification delivery failed"
            );
        }
    });
}
