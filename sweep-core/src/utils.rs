//! Utility functions for formatting and host identification.

use std::process::Command;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Joins thresholds for display, collapsing long regular runs
/// (`0, 10, 20` or `0..=200 step 10`).
#[must_use]
pub fn format_thresholds(thresholds: &[u32]) -> String {
    match thresholds {
        [] => String::new(),
        [first, .., last] if thresholds.len() > 6 => {
            let step = thresholds[1].saturating_sub(*first);
            let regular = thresholds.windows(2).all(|w| w[1].checked_sub(w[0]) == Some(step));
            if regular {
                format!("{first}..={last} step {step}")
            } else {
                format!("{first}..={last} ({} values)", thresholds.len())
            }
        }
        _ => thresholds
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Hostname used to tag notifications, `unknown-host` if it cannot be found.
#[must_use]
pub fn get_hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .or_else(|| {
            Command::new("hostname")
                .output()
                .ok()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| "unknown-host".to_string())
}
