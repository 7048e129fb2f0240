// sweep-core/src/notifications/mocks.rs

use super::{NotificationSender, NotificationType};
use crate::error::{CoreError, CoreResult};

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records every notification it is asked to send.
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<NotificationType>>,
    fail: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes every send fail after recording the notification.
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn get_sent(&self) -> Vec<NotificationType> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl NotificationSender for MockNotifier {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::NotificationError(
                "scripted notification failure".to_string(),
            ));
        }
        Ok(())
    }
}
