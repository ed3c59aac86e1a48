//! Transient user-facing notifications.
//!
//! Every recognition run ends with a short message for the user ("OCR
//! completed successfully!", or the error text). The pipeline does not know
//! how that message is shown, so it talks to an injected [`Notifier`].
//!
//! [`TransientNotifier`] is the stateful implementation: it holds at most one
//! active message and clears it after a fixed interval. A newer message
//! replaces the old one and the old message's scheduled clear becomes a no-op.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Visual flavour of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Success,
    Error,
}

/// A message currently on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Receiver for user-facing messages.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, kind: NotificationKind);
}

/// Forwards notifications to `tracing`.
///
/// Used when no notifier is configured.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => info!("{}", message),
            NotificationKind::Error => warn!("{}", message),
        }
    }
}

#[derive(Default)]
struct Slot {
    current: Mutex<Option<Notification>>,
    generation: AtomicU64,
}

/// Single-slot notification holder with a scheduled clear.
///
/// `show` must be called from within a tokio runtime; the clear is a spawned
/// task that sleeps for the dismiss interval. Without a runtime the message
/// stays until replaced or [`TransientNotifier::dismiss`] is called.
#[derive(Clone)]
pub struct TransientNotifier {
    slot: Arc<Slot>,
    dismiss_after: Duration,
}

impl TransientNotifier {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            slot: Arc::new(Slot::default()),
            dismiss_after,
        }
    }

    /// The message currently on display, if any.
    pub fn current(&self) -> Option<Notification> {
        lock(&self.slot.current).clone()
    }

    /// Clear the current message immediately.
    pub fn dismiss(&self) {
        self.slot.generation.fetch_add(1, Ordering::SeqCst);
        *lock(&self.slot.current) = None;
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }
}

impl Default for TransientNotifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Notifier for TransientNotifier {
    fn show(&self, message: &str, kind: NotificationKind) {
        debug!(?kind, "{}", message);
        let generation = self.slot.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.slot.current) = Some(Notification {
            message: message.to_string(),
            kind,
        });

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let slot = Arc::clone(&self.slot);
        let delay = self.dismiss_after;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            // A newer message owns the slot now.
            if slot.generation.load(Ordering::SeqCst) == generation {
                *lock(&slot.current) = None;
            }
        });
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn message_is_cleared_after_interval() {
        let n = TransientNotifier::new(Duration::from_secs(5));
        n.show("OCR completed successfully!", NotificationKind::Success);
        assert_eq!(
            n.current().map(|m| m.message),
            Some("OCR completed successfully!".to_string())
        );

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(n.current().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(n.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_survives_older_timer() {
        let n = TransientNotifier::new(Duration::from_secs(5));
        n.show("first", NotificationKind::Success);
        tokio::time::sleep(Duration::from_secs(3)).await;
        n.show("second", NotificationKind::Error);

        // First timer fires at t=5s and must not clear "second".
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let current = n.current().expect("second still visible");
        assert_eq!(current.message, "second");
        assert_eq!(current.kind, NotificationKind::Error);

        // Second timer fires at t=8s.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(n.current().is_none());
    }

    #[test]
    fn show_without_runtime_keeps_message() {
        let n = TransientNotifier::default();
        n.show("kept", NotificationKind::Success);
        assert_eq!(n.current().unwrap().message, "kept");
        n.dismiss();
        assert!(n.current().is_none());
    }

    #[test]
    fn kind_serialises_lowercase() {
        let json = serde_json::to_string(&NotificationKind::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }
}
