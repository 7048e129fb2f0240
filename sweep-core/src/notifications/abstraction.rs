// ============================================================================
// sweep-core/src/notifications/abstraction.rs
// ============================================================================
//
// NOTIFICATION ABSTRACTION: Notification types and the sender trait
//
// The sweep controller describes what happened as a NotificationType and
// hands it to whatever NotificationSender it was given. Senders decide how
// (and whether) to deliver it.
//
// KEY COMPONENTS:
// - NotificationType: Enum of different notification types
// - NotificationSender: Trait for sending notifications
// - NullNotificationSender: No-op implementation for when notifications aren't needed

// ---- Internal crate imports ----
use crate::error::CoreResult;

// ---- Standard library imports ----
use std::time::Duration;

// ============================================================================
// NOTIFICATION TYPES
// ============================================================================

/// Represents different types of notifications that can be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationType {
    /// The sweep has passed setup and is about to run its first invocation
    SweepStarted {
        /// Number of assets in the manifest
        assets: usize,
        /// Number of invocations planned
        invocations: usize,
        /// Hostname of the machine running the sweep
        hostname: String,
    },

    /// The sweep ran to completion
    SweepComplete {
        /// Number of invocations run
        invocations: usize,
        /// Number of invocations that did not succeed
        failures: usize,
        /// Wall-clock duration of the sweep
        duration: Duration,
        /// Hostname of the machine running the sweep
        hostname: String,
    },

    /// An asset was skipped or had thresholds abandoned
    AssetProblem {
        /// The asset identifier
        asset: String,
        /// What went wrong
        message: String,
        /// Hostname of the machine running the sweep
        hostname: String,
    },

    /// A custom notification message
    Custom {
        /// Title of the notification
        title: String,
        /// Message body
        message: String,
        /// Priority level (1-5, with 5 being highest)
        priority: u8,
    },
}

impl NotificationType {
    /// Gets the title for this notification type.
    pub fn get_title(&self) -> String {
        match self {
            NotificationType::SweepStarted { .. } => "Sweep Started".to_string(),
            NotificationType::SweepComplete { .. } => "Sweep Complete".to_string(),
            NotificationType::AssetProblem { .. } => "Sweep Asset Problem".to_string(),
            NotificationType::Custom { title, .. } => title.clone(),
        }
    }

    /// Gets the message body for this notification type.
    pub fn get_message(&self) -> String {
        match self {
            NotificationType::SweepStarted {
                assets,
                invocations,
                hostname,
            } => format!(
                "Started sweeping {assets} asset(s), {invocations} invocation(s) on {hostname}"
            ),
            NotificationType::SweepComplete {
                invocations,
                failures,
                duration,
                hostname,
            } => {
                let duration_secs = duration.as_secs();
                let duration_str = if duration_secs >= 3600 {
                    format!(
                        "{}h {}m {}s",
                        duration_secs / 3600,
                        (duration_secs % 3600) / 60,
                        duration_secs % 60
                    )
                } else if duration_secs >= 60 {
                    format!("{}m {}s", duration_secs / 60, duration_secs % 60)
                } else {
                    format!("{duration_secs}s")
                };
                format!(
                    "Completed {invocations} invocation(s) on {hostname} in {duration_str}. {failures} failed"
                )
            }
            NotificationType::AssetProblem {
                asset,
                message,
                hostname,
            } => format!("{asset} on {hostname}: {message}"),
            NotificationType::Custom { message, .. } => message.clone(),
        }
    }

    /// Gets the priority level for this notification type (1-5).
    pub fn get_priority(&self) -> u8 {
        match self {
            NotificationType::SweepStarted { .. } => 3,
            NotificationType::SweepComplete { failures, .. } => {
                if *failures > 0 {
                    4
                } else {
                    3
                }
            }
            NotificationType::AssetProblem { .. } => 4,
            NotificationType::Custom { priority, .. } => *priority,
        }
    }

    /// Tag identifying the notification kind.
    pub fn get_tag(&self) -> Option<&'static str> {
        match self {
            NotificationType::SweepStarted { .. } => Some("start"),
            NotificationType::SweepComplete { .. } => Some("complete"),
            NotificationType::AssetProblem { .. } => Some("warning"),
            NotificationType::Custom { .. } => None,
        }
    }
}

// ============================================================================
// NOTIFICATION SENDER
// ============================================================================

/// Trait for sending notifications.
pub trait NotificationSender: Send + Sync {
    /// Sends a notification.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the notification was sent successfully
    /// * `Err(CoreError::NotificationError)` - If delivery failed
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()>;
}

/// No-op implementation of NotificationSender that does nothing.
#[derive(Debug, Clone, Default)]
pub struct NullNotificationSender;

impl NotificationSender for NullNotificationSender {
    fn send_notification(&self, _notification: &NotificationType) -> CoreResult<()> {
        Ok(())
    }
}
