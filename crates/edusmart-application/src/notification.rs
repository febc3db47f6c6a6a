//! User-visible notifications.
//!
//! Services report outcomes the user should see (a campus switch, a failed
//! sync) through a [`Notifier`]. The view layer drains the receiving end.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A single message for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Sending half of the notification channel.
///
/// A notifier without a channel only logs. Sends never block and are
/// dropped silently once the receiver is gone.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<mpsc::UnboundedSender<Notification>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A notifier that only logs.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::warn!("[Notify] {}", notification.message)
            }
            _ => tracing::info!("[Notify] {}", notification.message),
        }
        if let Some(sender) = &self.sender {
            let _ = sender.send(notification);
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notification::new(NotificationLevel::Success, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notification::new(NotificationLevel::Info, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::new(NotificationLevel::Error, message));
    }
}
