// ============================================================================
// adder-sweep/src/commands/sweep.rs
// ============================================================================
//
// SWEEP COMMAND: Maps CLI arguments onto the core sweep controller
//
// Builds a SweepConfig from the arguments, picks the terminal or JSON
// reporter, wires up optional ntfy notifications and runs the sweep with the
// process-backed transcoder. The controller log file is opened once the
// sweep reports that setup succeeded. The JSON summary, if requested, is
// written after the sweep returns.

use crate::cli::SweepArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::logging::ControllerLog;

use adder_sweep_core::config::{ScratchMode, SweepConfig, SweepConfigBuilder};
use adder_sweep_core::external::{ProcessTranscoder, RunConfiguration};
use adder_sweep_core::notifications::{NotificationSender, NtfyNotificationSender};
use adder_sweep_core::processing::CancelFlag;
use adder_sweep_core::reporting::{
    AssetContext, AssetReport, InvocationRecord, JsonReporter, Reporter, SweepPlan,
    TerminalReporter,
};
use adder_sweep_core::{SweepReport, run_sweep};

use std::path::Path;
use std::time::Duration;

use log::{info, warn};

/// Builds the sweep configuration from the command-line arguments.
pub fn build_config(args: &SweepArgs) -> CliResult<SweepConfig> {
    let mut builder = SweepConfigBuilder::new()
        .dataset_root(args.dataset_root.clone())
        .manifest_path(args.manifest.clone())
        .output_root(args.output_root.clone())
        .max_threshold(args.max_threshold)
        .scratch_dir(args.scratch_dir.clone())
        .transcoder_program(&args.transcoder)
        .transcoder_args(args.transcoder_args.iter().cloned())
        .cooldown(Duration::from_secs(args.cooldown_secs))
        .invocation_timeout(args.timeout_secs.map(Duration::from_secs));

    if args.per_run_scratch {
        builder = builder.scratch_mode(ScratchMode::PerRun);
    }
    if let Some(topic) = &args.ntfy {
        builder = builder.ntfy_topic(topic);
    }

    builder.build().cli_context("Invalid sweep settings")
}

/// Creates the notification sender for the configured topic.
///
/// An unusable topic disables notifications rather than the sweep.
fn notification_sender(config: &SweepConfig) -> Option<NtfyNotificationSender> {
    let topic = config.ntfy_topic.as_deref()?;
    match NtfyNotificationSender::new(topic) {
        Ok(sender) => {
            info!("Sending notifications to {}", sender.topic_url());
            Some(sender)
        }
        Err(e) => {
            warn!("Notifications disabled: {}", e);
            None
        }
    }
}

/// Forwards every event to `inner`, opening the controller log first when
/// the sweep starts.
struct ControllerLogReporter<'a> {
    inner: &'a dyn Reporter,
    log: Option<&'a ControllerLog>,
}

impl Reporter for ControllerLogReporter<'_> {
    fn sweep_started(&self, plan: &SweepPlan) {
        if let Some(log) = self.log {
            match log.open() {
                Ok(()) => info!("Controller log: {}", log.path().display()),
                Err(e) => warn!("Controller log disabled: {:#}", e),
            }
        }
        self.inner.sweep_started(plan);
    }

    fn asset_started(&self, context: &AssetContext<'_>) {
        self.inner.asset_started(context);
    }

    fn invocation_started(&self, run: &RunConfiguration, log_path: &Path) {
        self.inner.invocation_started(run, log_path);
    }

    fn invocation_finished(&self, record: &InvocationRecord) {
        self.inner.invocation_finished(record);
    }

    fn asset_finished(&self, report: &AssetReport) {
        self.inner.asset_finished(report);
    }

    fn cooldown_started(&self, duration: Duration) {
        self.inner.cooldown_started(duration);
    }

    fn cooldown_finished(&self) {
        self.inner.cooldown_finished();
    }

    fn sweep_finished(&self, report: &SweepReport) {
        self.inner.sweep_finished(report);
    }
}

/// Runs the sweep described by `args`, writing `controller_log` once setup
/// has succeeded.
pub fn run_sweep_command(
    args: &SweepArgs,
    controller_log: Option<&ControllerLog>,
) -> CliResult<SweepReport> {
    let config = build_config(args)?;
    let transcoder = ProcessTranscoder::from_config(&config);

    let display: Box<dyn Reporter> = if args.progress_json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };
    let reporter = ControllerLogReporter {
        inner: display.as_ref(),
        log: controller_log,
    };

    let notifier = notification_sender(&config);
    let notifier_ref = notifier.as_ref().map(|n| n as &dyn NotificationSender);

    let report = run_sweep(
        &config,
        &transcoder,
        &reporter,
        notifier_ref,
        &CancelFlag::new(),
    )?;

    if let Some(path) = &args.summary_json {
        report
            .write_json(path)
            .cli_with_context(|| format!("Sweep finished but the summary was not saved to {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_cli_from;

    fn args(extra: &[&str]) -> SweepArgs {
        let mut argv = vec!["adder-sweep", "/data", "/data/m.txt", "/out", "25", "/tmp"];
        argv.extend_from_slice(extra);
        parse_cli_from(argv).unwrap().sweep
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&args(&[])).unwrap();
        assert_eq!(config.max_threshold, 25);
        assert_eq!(config.cooldown, Duration::from_secs(60));
        assert_eq!(config.scratch_mode, ScratchMode::Shared);
        assert!(config.invocation_timeout.is_none());
        assert_eq!(config.thresholds().iter().collect::<Vec<_>>(), vec![0, 10, 20, 25]);
    }

    #[test]
    fn test_build_config_options() {
        let config = build_config(&args(&[
            "--per-run-scratch",
            "--cooldown-secs",
            "5",
            "--timeout-secs",
            "90",
            "--transcoder",
            "/opt/adder/bin/adder_simulproc",
        ]))
        .unwrap();
        assert_eq!(config.scratch_mode, ScratchMode::PerRun);
        assert_eq!(config.cooldown, Duration::from_secs(5));
        assert_eq!(config.invocation_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.transcoder_program, "/opt/adder/bin/adder_simulproc");
    }

    #[test]
    fn test_bad_ntfy_topic_disables_notifications() {
        let config = build_config(&args(&["--ntfy", "not a url"])).unwrap();
        assert!(notification_sender(&config).is_none());
    }
}
