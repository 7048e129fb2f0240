//! Optional push notifications about sweep progress.
//!
//! Notification failures never affect a sweep: the controller logs them as
//! warnings and carries on.

mod abstraction;
pub mod mocks;
mod ntfy;

pub use abstraction::{NotificationSender, NotificationType, NullNotificationSender};
pub use ntfy::NtfyNotificationSender;

/// Sends `notification` if a sender is configured, logging any failure.
pub(crate) fn notify(sender: Option<&dyn NotificationSender>, notification: NotificationType) {
    if let Some(sender) = sender {
        if let Err(e) = sender.send_notification(&notification) {
            log::warn!(
                "Failed to send '{}' notification: {}",
                notification.get_title(),
                e
            );
        }
    }
}
