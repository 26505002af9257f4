//! Transient status messages: one at a time, expiring after a fixed delay.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;

pub const DEFAULT_NOTIFY_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Increases with every emitted notification.
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
}

struct Active {
    notification: Notification,
    expires_at: Instant,
}

/// Holds the most recent notification. A newer one replaces the older and gets its own
/// full lifetime; nothing is queued.
pub struct Notifier {
    ttl: Duration,
    enabled: AtomicBool,
    next_id: AtomicU64,
    current: RwLock<Option<Active>>,
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = broadcast::channel(32);
        Self {
            ttl,
            enabled: AtomicBool::new(true),
            next_id: AtomicU64::new(0),
            current: RwLock::new(None),
            tx,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Show `message`, replacing whatever is displayed. Returns `None` when notifications
    /// are disabled; the message is still logged.
    pub async fn notify(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Option<Notification> {
        let message = message.into();
        if !self.is_enabled() {
            tracing::debug!(?kind, %message, "notification suppressed");
            return None;
        }
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            message,
            kind,
        };
        *self.current.write().await = Some(Active {
            notification: notification.clone(),
            expires_at: Instant::now() + self.ttl,
        });
        // No subscriber is fine.
        let _ = self.tx.send(notification.clone());
        Some(notification)
    }

    pub async fn success(&self, message: impl Into<String>) -> Option<Notification> {
        self.notify(message, NotificationKind::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Option<Notification> {
        self.notify(message, NotificationKind::Error).await
    }

    /// Notification still on screen, if any.
    pub async fn current(&self) -> Option<Notification> {
        let guard = self.current.read().await;
        guard
            .as_ref()
            .filter(|a| Instant::now() < a.expires_at)
            .map(|a| a.notification.clone())
    }

    pub async fn dismiss(&self) {
        *self.current.write().await = None;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_TTL)
    }
}
