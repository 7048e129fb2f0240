// ============================================================================
// sweep-core/src/notifications/ntfy.rs
// ============================================================================
//
// NTFY IMPLEMENTATION: Notification Implementation Using ntfy.sh
//
// Delivers notifications to an ntfy topic given as a full URL such as
// `https://ntfy.sh/adder-sweeps`. Uses the blocking dispatcher of the ntfy
// crate; the sweep is synchronous anyway.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::notifications::{NotificationSender, NotificationType};

// ---- External crate imports ----
use ntfy::DispatcherBuilder;
use ntfy::payload::{Payload, Priority as NtfyPriority};

/// Sends notifications to an ntfy server.
///
/// # Examples
///
/// ```rust,no_run
/// use adder_sweep_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
/// use std::time::Duration;
///
/// let sender = NtfyNotificationSender::new("https://ntfy.sh/your_topic").unwrap();
///
/// let notification = NotificationType::SweepComplete {
///     invocations: 22,
///     failures: 0,
///     duration: Duration::from_secs(5400),
///     hostname: "bench-rig".to_string(),
/// };
///
/// sender.send_notification(&notification).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct NtfyNotificationSender {
    base_url: String,
    topic: String,
}

impl NtfyNotificationSender {
    /// Creates a sender for `topic_url`.
    ///
    /// # Errors
    ///
    /// * `CoreError::NotificationError` - If the URL is not `https://host/topic`
    pub fn new(topic_url: &str) -> CoreResult<Self> {
        let (base_url, topic) = split_topic_url(topic_url)?;
        Ok(Self { base_url, topic })
    }

    /// The full topic URL.
    pub fn topic_url(&self) -> String {
        format!("{}/{}", self.base_url, self.topic)
    }
}

impl NotificationSender for NtfyNotificationSender {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()> {
        let dispatcher = DispatcherBuilder::new(&self.base_url)
            .build_blocking()
            .map_err(|e| {
                CoreError::NotificationError(format!(
                    "Failed to build ntfy dispatcher for {}: {}",
                    self.base_url, e
                ))
            })?;

        let priority = map_priority(notification.get_priority()).unwrap_or_else(|| {
            log::warn!(
                "Invalid ntfy priority value provided: {}",
                notification.get_priority()
            );
            NtfyPriority::Default
        });

        let mut tags = vec!["adder-sweep".to_string()];
        if let Some(tag) = notification.get_tag() {
            tags.push(tag.to_string());
        }

        let payload = Payload::new(&self.topic)
            .message(notification.get_message())
            .title(notification.get_title())
            .priority(priority)
            .tags(tags);

        dispatcher.send(&payload).map_err(|e| {
            CoreError::NotificationError(format!(
                "Failed to send ntfy notification to {}: {}",
                self.topic_url(),
                e
            ))
        })?;

        log::debug!("Sent ntfy notification: {}", notification.get_title());
        Ok(())
    }
}

/// Splits `https://host[:port]/topic` into base URL and topic.
fn split_topic_url(topic_url: &str) -> CoreResult<(String, String)> {
    let Some(after_scheme) = topic_url.strip_prefix("https://") else {
        return Err(CoreError::NotificationError(format!(
            "Invalid ntfy topic URL '{topic_url}': must start with https://"
        )));
    };

    let (host, topic) = after_scheme.split_once('/').unwrap_or((after_scheme, ""));
    if host.is_empty() {
        return Err(CoreError::NotificationError(format!(
            "URL '{topic_url}' must have a non-empty host"
        )));
    }

    let topic = topic.trim_end_matches('/');
    if topic.is_empty() {
        return Err(CoreError::NotificationError(format!(
            "URL '{topic_url}' is missing topic path"
        )));
    }

    Ok((format!("https://{host}"), topic.to_string()))
}

/// Maps a numeric priority (1-5) to the ntfy priority.
fn map_priority(p: u8) -> Option<NtfyPriority> {
    match p {
        1 => Some(NtfyPriority::Min),
        2 => Some(NtfyPriority::Low),
        3 => Some(NtfyPriority::Default),
        4 => Some(NtfyPriority::High),
        5 => Some(NtfyPriority::Max),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_topic_url() {
        let sender = NtfyNotificationSender::new("https://ntfy.sh/adder-sweeps").unwrap();
        assert_eq!(sender.base_url, "https://ntfy.sh");
        assert_eq!(sender.topic, "adder-sweeps");
        assert_eq!(sender.topic_url(), "https://ntfy.sh/adder-sweeps");
    }

    #[test]
    fn test_invalid_topic_urls() {
        for url in ["http://ntfy.sh/topic", "https://", "https:///topic", "https://ntfy.sh", "https://ntfy.sh/"] {
            assert!(
                matches!(
                    NtfyNotificationSender::new(url),
                    Err(CoreError::NotificationError(_))
                ),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_map_priority() {
        assert!(matches!(map_priority(1), Some(NtfyPriority::Min)));
        assert!(matches!(map_priority(5), Some(NtfyPriority::Max)));
        assert!(map_priority(0).is_none());
        assert!(map_priority(6).is_none());
    }
}
