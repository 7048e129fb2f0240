//! Progress reporting for a running sweep.
//!
//! The sweep controller calls a [`Reporter`] at each step. Every hook has a
//! no-op default so implementations only override what they display. The
//! terminal and JSON reporters live in submodules; [`LogReporter`] writes
//! through the `log` facade and is what library callers get by default.

mod json;
mod summary;
mod terminal;

pub use json::JsonReporter;
pub use summary::{AssetReport, AssetStatus, InvocationOutcome, InvocationRecord, SweepReport};
pub use terminal::TerminalReporter;

use crate::config::ScratchMode;
use crate::external::RunConfiguration;
use crate::manifest::Asset;
use crate::utils::{format_duration, format_thresholds};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the sweep is about to do.
#[derive(Clone, Debug)]
pub struct SweepPlan {
    pub assets: Vec<String>,
    pub thresholds: Vec<u32>,
    pub output_root: PathBuf,
    pub scratch_dir: PathBuf,
    pub scratch_mode: ScratchMode,
    pub cooldown: Duration,
}

impl SweepPlan {
    pub fn total_invocations(&self) -> usize {
        self.assets.len() * self.thresholds.len()
    }
}

/// Position of an asset within the sweep.
#[derive(Clone, Debug)]
pub struct AssetContext<'a> {
    pub asset: &'a Asset,
    /// 1-based
    pub position: usize,
    pub total: usize,
}

/// Observer interface implemented by the human-readable and JSON reporters.
pub trait Reporter: Send + Sync {
    fn sweep_started(&self, _plan: &SweepPlan) {}
    fn asset_started(&self, _context: &AssetContext<'_>) {}
    fn invocation_started(&self, _run: &RunConfiguration, _log_path: &Path) {}
    fn invocation_finished(&self, _record: &InvocationRecord) {}
    fn asset_finished(&self, _report: &AssetReport) {}
    fn cooldown_started(&self, _duration: Duration) {}
    fn cooldown_finished(&self) {}
    fn sweep_finished(&self, _report: &SweepReport) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Reporter that writes plain log records.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn sweep_started(&self, plan: &SweepPlan) {
        log::info!(
            "Sweeping {} asset(s) over thresholds {} ({} invocations)",
            plan.assets.len(),
            format_thresholds(&plan.thresholds),
            plan.total_invocations()
        );
    }

    fn invocation_finished(&self, record: &InvocationRecord) {
        if record.outcome.is_success() {
            log::info!(
                "{} @ {}: {} in {}",
                record.asset,
                record.threshold,
                record.outcome.describe(),
                format_duration(record.elapsed_secs)
            );
        } else {
            log::warn!(
                "{} @ {}: {} (log: {})",
                record.asset,
                record.threshold,
                record.outcome.describe(),
                record.log_path.display()
            );
        }
    }

    fn cooldown_started(&self, duration: Duration) {
        log::info!("Cooling down for {}s", duration.as_secs());
    }

    fn sweep_finished(&self, report: &SweepReport) {
        log::info!(
            "Sweep finished in {}: {} of {} invocation(s) succeeded",
            format_duration(report.duration_secs),
            report.succeeded(),
            report.total_invocations()
        );
    }
}
