//! Sweep summary reporting.
//!
//! Every invocation yields an [`InvocationRecord`]; records are grouped per
//! asset and collected into the [`SweepReport`] returned by
//! [`run_sweep`](crate::run_sweep). The report serializes to JSON for the
//! `--summary-json` output.

use crate::error::{CoreError, CoreResult};

use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How one invocation ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// Exit code zero
    Succeeded,
    /// Nonzero exit code, or `None` when the process was killed by a signal
    Failed { exit_code: Option<i32> },
    /// The process could not be started or waited for
    SpawnFailed { message: String },
    /// The process exceeded the invocation timeout and was killed
    TimedOut { after_secs: f64 },
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Succeeded)
    }

    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self {
            InvocationOutcome::Succeeded => "ok".to_string(),
            InvocationOutcome::Failed {
                exit_code: Some(code),
            } => format!("exit code {code}"),
            InvocationOutcome::Failed { exit_code: None } => "killed by signal".to_string(),
            InvocationOutcome::SpawnFailed { message } => format!("failed to start: {message}"),
            InvocationOutcome::TimedOut { after_secs } => format!("timed out after {after_secs:.0}s"),
        }
    }
}

/// Result of one (asset, threshold) invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationRecord {
    pub asset: String,
    pub threshold: u32,
    pub log_path: PathBuf,
    pub outcome: InvocationOutcome,
    pub elapsed_secs: f64,
}

/// What happened to an asset as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetStatus {
    /// Every threshold was attempted
    Completed,
    /// No threshold was attempted
    Skipped { reason: String },
    /// Some thresholds were abandoned
    Aborted { reason: String },
}

/// Per-asset section of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReport {
    pub asset: String,
    pub output_dir: PathBuf,
    #[serde(flatten)]
    pub status: AssetStatus,
    pub invocations: Vec<InvocationRecord>,
}

impl AssetReport {
    pub fn succeeded(&self) -> usize {
        self.invocations
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.invocations.len() - self.succeeded()
    }
}

/// Everything a sweep did, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    /// Local start time, RFC 3339
    pub started_at: String,
    pub duration_secs: f64,
    pub thresholds: Vec<u32>,
    pub assets: Vec<AssetReport>,
}

impl SweepReport {
    /// Starts an empty report stamped with the current time.
    pub fn new(thresholds: Vec<u32>) -> Self {
        Self {
            started_at: Local::now().to_rfc3339(),
            duration_secs: 0.0,
            thresholds,
            assets: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs.max(0.0))
    }

    /// All invocation records across assets.
    pub fn invocations(&self) -> impl Iterator<Item = &InvocationRecord> {
        self.assets.iter().flat_map(|a| a.invocations.iter())
    }

    pub fn total_invocations(&self) -> usize {
        self.invocations().count()
    }

    pub fn succeeded(&self) -> usize {
        self.invocations().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total_invocations() - self.succeeded()
    }

    pub fn assets_with_status(&self, predicate: impl Fn(&AssetStatus) -> bool) -> usize {
        self.assets.iter().filter(|a| predicate(&a.status)).count()
    }

    pub fn completed_assets(&self) -> usize {
        self.assets_with_status(|s| matches!(s, AssetStatus::Completed))
    }

    pub fn skipped_assets(&self) -> usize {
        self.assets_with_status(|s| matches!(s, AssetStatus::Skipped { .. }))
    }

    pub fn aborted_assets(&self) -> usize {
        self.assets_with_status(|s| matches!(s, AssetStatus::Aborted { .. }))
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            CoreError::OperationFailed(format!("Failed to serialize sweep report: {e}"))
        })?;
        std::fs::write(path, json).map_err(|e| {
            CoreError::PathError(format!(
                "Failed to write sweep report to {}: {}",
                path.display(),
                e
            ))
        })
    }
}
