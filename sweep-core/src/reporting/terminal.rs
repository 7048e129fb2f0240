//! Human-friendly terminal reporter.
//!
//! Prints section headers and one result line per invocation. While an
//! invocation or a cooldown is in progress a spinner shows what the sweep
//! is waiting on; it is cleared before anything else is printed.

use super::{AssetContext, AssetReport, AssetStatus, InvocationRecord, Reporter, SweepPlan, SweepReport};
use crate::config::ScratchMode;
use crate::external::RunConfiguration;
use crate::utils::{format_duration, format_thresholds};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const SPINNER_TICK: Duration = Duration::from_millis(120);

/// Reporter printing concise, styled text to stdout.
pub struct TerminalReporter {
    progress: Mutex<Option<ProgressBar>>,
    total_invocations: AtomicUsize,
    started_invocations: AtomicUsize,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(None),
            total_invocations: AtomicUsize::new(0),
            started_invocations: AtomicUsize::new(0),
        }
    }

    fn start_spinner(&self, message: String) {
        self.finish_spinner();

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .template("  {spinner} {msg} [{elapsed_precise}]")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(SPINNER_TICK);

        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Reporter for TerminalReporter {
    fn sweep_started(&self, plan: &SweepPlan) {
        self.total_invocations
            .store(plan.total_invocations(), Ordering::Relaxed);
        self.started_invocations.store(0, Ordering::Relaxed);

        let scratch = match plan.scratch_mode {
            ScratchMode::Shared => "shared",
            ScratchMode::PerRun => "per run",
        };

        println!("\n{}", style("SWEEP").bold().cyan());
        println!("  {:<12} {}", style("Assets:").bold(), plan.assets.len());
        println!(
            "  {:<12} {}",
            style("Thresholds:").bold(),
            format_thresholds(&plan.thresholds)
        );
        println!(
            "  {:<12} {}",
            style("Invocations:").bold(),
            plan.total_invocations()
        );
        println!(
            "  {:<12} {}",
            style("Output:").bold(),
            plan.output_root.display()
        );
        println!(
            "  {:<12} {} ({})",
            style("Scratch:").bold(),
            plan.scratch_dir.display(),
            scratch
        );
        println!(
            "  {:<12} {}s",
            style("Cooldown:").bold(),
            plan.cooldown.as_secs()
        );
    }

    fn asset_started(&self, context: &AssetContext<'_>) {
        println!(
            "\n{} {}",
            style(format!("ASSET {}/{}", context.position, context.total))
                .bold()
                .cyan(),
            style(context.asset).bold()
        );
    }

    fn invocation_started(&self, run: &RunConfiguration, _log_path: &Path) {
        let n = self.started_invocations.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total_invocations.load(Ordering::Relaxed);
        self.start_spinner(format!(
            "[{n}/{total}] threshold {} running",
            run.threshold
        ));
    }

    fn invocation_finished(&self, record: &InvocationRecord) {
        self.finish_spinner();

        let marker = if record.outcome.is_success() {
            style("✓").green().bold()
        } else {
            style("✗").red().bold()
        };
        let outcome = if record.outcome.is_success() {
            style(record.outcome.describe()).dim()
        } else {
            style(record.outcome.describe()).red()
        };
        println!(
            "  {} threshold {:>4}  {}  {}",
            marker,
            record.threshold,
            format_duration(record.elapsed_secs),
            outcome
        );
    }

    fn asset_finished(&self, report: &AssetReport) {
        match &report.status {
            AssetStatus::Completed => {}
            AssetStatus::Skipped { reason } => println!(
                "  {} {}",
                style("Skipped:").yellow().bold(),
                reason
            ),
            AssetStatus::Aborted { reason } => println!(
                "  {} {}",
                style("Aborted:").yellow().bold(),
                reason
            ),
        }
    }

    fn cooldown_started(&self, duration: Duration) {
        self.start_spinner(format!("cooling down for {}s", duration.as_secs()));
    }

    fn cooldown_finished(&self) {
        self.finish_spinner();
    }

    fn sweep_finished(&self, report: &SweepReport) {
        self.finish_spinner();

        println!("\n{}", style("SWEEP SUMMARY").bold().cyan());
        let tally = format!(
            "{} of {} invocations succeeded",
            report.succeeded(),
            report.total_invocations()
        );
        if report.failed() == 0 {
            println!("  {}", style(tally).green().bold());
        } else {
            println!("  {}", style(tally).yellow().bold());
        }
        println!(
            "  Assets: {} completed, {} aborted, {} skipped",
            report.completed_assets(),
            report.aborted_assets(),
            report.skipped_assets()
        );
        println!("  Time: {}", format_duration(report.duration_secs));

        for record in report.invocations().filter(|r| !r.outcome.is_success()) {
            println!(
                "  - {} @ {}: {} ({})",
                record.asset,
                record.threshold,
                style(record.outcome.describe()).red(),
                record.log_path.display()
            );
        }
    }
}
