//! Per-file notification channel to the presentation layer

use tokio::sync::mpsc;

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-visible notification (toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    /// A file was processed successfully
    #[must_use]
    pub fn processed(file_name: &str) -> Self {
        Self {
            title: "Background removed".to_string(),
            description: format!("{} was processed successfully", file_name),
            severity: Severity::Success,
        }
    }

    /// A file failed to process
    #[must_use]
    pub fn failed(file_name: &str, error: &str) -> Self {
        Self {
            title: "Processing failed".to_string(),
            description: format!("{}: {}", file_name, error),
            severity: Severity::Error,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Receiver of pipeline notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that discards notifications
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn notify(&self, _notification: Notification) {}
}

/// Sink that forwards notifications over an unbounded channel
pub struct ChannelNotificationSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotificationSink {
    /// Create a sink together with the receiving end
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotificationSink {
    fn notify(&self, notification: Notification) {
        // Receiver dropped means nobody is watching any more
        let _ = self.sender.send(notification);
    }
}
