//! Presentation-boundary services: upload progress and notifications

pub mod notification;
pub mod progress;

pub use notification::{
    ChannelNotificationSink, NoOpNotificationSink, Notification, NotificationSink, Severity,
};
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter, UploadProgress,
};
