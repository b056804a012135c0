//! services/app/src/session/notifications.rs
//!
//! A single-slot queue for transient status toasts. A new notification
//! replaces whatever is showing; an undisturbed notification dismisses
//! itself after its TTL.

use std::sync::Arc;

use storybook_core::domain::Notification;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Holds at most one active notification at a time.
pub struct NotificationQueue {
    slot: Arc<Mutex<Option<Notification>>>,
    ttl_task: Option<CancellationToken>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            ttl_task: None,
        }
    }

    /// Shows a notification, replacing any active one, and arms its
    /// auto-dismiss timer. The replaced notification's timer is cancelled
    /// first so it cannot clear the newcomer.
    pub async fn push(&mut self, notification: Notification) {
        if let Some(token) = self.ttl_task.take() {
            token.cancel();
        }

        let token = CancellationToken::new();
        self.ttl_task = Some(token.clone());

        let ttl = notification.ttl;
        *self.slot.lock().await = Some(notification);

        let slot = self.slot.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    slot.lock().await.take();
                }
            }
        });
    }

    /// Clears the active notification, if any. Idempotent.
    pub async fn dismiss(&mut self) {
        if let Some(token) = self.ttl_task.take() {
            token.cancel();
        }
        self.slot.lock().await.take();
    }

    pub async fn current(&self) -> Option<Notification> {
        self.slot.lock().await.clone()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        if let Some(token) = self.ttl_task.take() {
            token.cancel();
        }
    }
}
