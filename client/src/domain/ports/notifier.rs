//! Driven port for the notification surface.

use crate::domain::Notification;

/// Sink for transient notifications.
///
/// Implementations must not block: controllers call `notify` while holding
/// no locks and continue immediately.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show `notification` to the user.
    fn notify(&self, notification: Notification);
}
