// ============================================================================
// sweep-core/src/processing/sweep.rs
// ============================================================================
//
// SWEEP CONTROLLER: Assets x thresholds, one invocation at a time
//
// For each asset in manifest order the controller creates the asset's log
// directory, then runs the transcoder once per threshold in increasing order
// with the invocation's stdout and stderr appended to
// `{output_root}/{asset}/{threshold}_{reference_time}.txt`. Between assets it
// cools down.
//
// FAILURE POLICY:
// - Setup problems (manifest, directories, missing transcoder) are errors
//   before any invocation runs.
// - A failed invocation is recorded and the sweep carries on.
// - An asset whose log directory cannot be created is skipped.
// - A timed-out invocation abandons the rest of its asset.
// - A vanished scratch directory or an unopenable run log halts the sweep.

// ---- Internal crate imports ----
use crate::config::SweepConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{ProcessTranscoder, RunConfiguration, RunStatus, Transcoder};
use crate::manifest::{Asset, read_manifest};
use crate::notifications::{NotificationSender, NotificationType, notify};
use crate::processing::cooldown::{CancelFlag, cool_down};
use crate::reporting::{
    AssetContext, AssetReport, AssetStatus, InvocationOutcome, InvocationRecord, LogReporter,
    Reporter, SweepPlan, SweepReport,
};
use crate::scratch::ScratchSpace;
use crate::utils::get_hostname;

// ---- Standard library imports ----
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Instant;

// ---- External crate imports ----
use tempfile::Builder as TempFileBuilder;

/// Runs a complete sweep.
///
/// Returns once every (asset, threshold) pair has been attempted, skipped or
/// abandoned. Individual invocation failures are reported in the returned
/// [`SweepReport`], not as errors.
///
/// # Errors
///
/// * `CoreError::Config` - invalid configuration
/// * `CoreError::Manifest` - unreadable or invalid manifest
/// * `CoreError::PathError` - unusable dataset or output root, or a run log
///   that cannot be opened
/// * `CoreError::Scratch` - unusable scratch directory
/// * `CoreError::DependencyNotFound` - the transcoder is not installed
/// * `CoreError::Interrupted` - `cancel` was set
pub fn run_sweep<T: Transcoder + ?Sized>(
    config: &SweepConfig,
    transcoder: &T,
    reporter: &dyn Reporter,
    notifier: Option<&dyn NotificationSender>,
    cancel: &CancelFlag,
) -> CoreResult<SweepReport> {
    // ========================================================================
    // STEP 1: SETUP
    // ========================================================================

    config.validate()?;

    let assets = read_manifest(&config.manifest_path)?;
    if assets.is_empty() {
        log::warn!(
            "Manifest {} lists no assets; nothing to do",
            config.manifest_path.display()
        );
    }

    if !config.dataset_root.is_dir() {
        return Err(CoreError::PathError(format!(
            "Dataset root {} is not a directory",
            config.dataset_root.display()
        )));
    }
    for asset in &assets {
        let source = asset.source_path(&config.dataset_root);
        if !source.exists() {
            log::warn!("Asset {} not found at {}", asset, source.display());
        }
    }

    prepare_output_root(&config.output_root)?;
    let mut scratch = ScratchSpace::prepare(&config.scratch_dir, config.scratch_mode)?;
    transcoder.check_available()?;

    let thresholds: Vec<u32> = config.thresholds().iter().collect();
    let plan = SweepPlan {
        assets: assets.iter().map(|a| a.as_str().to_string()).collect(),
        thresholds: thresholds.clone(),
        output_root: config.output_root.clone(),
        scratch_dir: config.scratch_dir.clone(),
        scratch_mode: config.scratch_mode,
        cooldown: config.cooldown,
    };

    let hostname = get_hostname();
    reporter.sweep_started(&plan);
    notify(
        notifier,
        NotificationType::SweepStarted {
            assets: assets.len(),
            invocations: plan.total_invocations(),
            hostname: hostname.clone(),
        },
    );

    // ========================================================================
    // STEP 2: SWEEP
    // ========================================================================

    let sweep_start = Instant::now();
    let mut report = SweepReport::new(thresholds.clone());

    for (index, asset) in assets.iter().enumerate() {
        cancel.check("cancelled before starting the next asset")?;

        reporter.asset_started(&AssetContext {
            asset,
            position: index + 1,
            total: assets.len(),
        });

        let asset_report = sweep_asset(
            config,
            transcoder,
            &mut scratch,
            asset,
            &thresholds,
            reporter,
            cancel,
        )?;

        reporter.asset_finished(&asset_report);
        match &asset_report.status {
            AssetStatus::Completed => {}
            AssetStatus::Skipped { reason } | AssetStatus::Aborted { reason } => notify(
                notifier,
                NotificationType::AssetProblem {
                    asset: asset.as_str().to_string(),
                    message: reason.clone(),
                    hostname: hostname.clone(),
                },
            ),
        }

        let ran_any = !asset_report.invocations.is_empty();
        report.assets.push(asset_report);

        // ====================================================================
        // STEP 3: COOLDOWN
        // ====================================================================

        let is_last = index + 1 == assets.len();
        if ran_any && !is_last && !config.cooldown.is_zero() {
            reporter.cooldown_started(config.cooldown);
            let result = cool_down(config.cooldown, cancel);
            reporter.cooldown_finished();
            result?;
        }
    }

    // ========================================================================
    // STEP 4: REPORT
    // ========================================================================

    report.duration_secs = sweep_start.elapsed().as_secs_f64();
    reporter.sweep_finished(&report);
    notify(
        notifier,
        NotificationType::SweepComplete {
            invocations: report.total_invocations(),
            failures: report.failed(),
            duration: report.duration(),
            hostname,
        },
    );

    Ok(report)
}

/// Runs a sweep with the five sweep inputs and every other option at its
/// default, using the transcoder on `PATH` and plain log output.
pub fn run_sweep_with_defaults(
    dataset_root: &Path,
    manifest_path: &Path,
    output_root: &Path,
    max_threshold: u32,
    scratch_dir: &Path,
) -> CoreResult<SweepReport> {
    let config = SweepConfig::new(
        dataset_root.to_path_buf(),
        manifest_path.to_path_buf(),
        output_root.to_path_buf(),
        max_threshold,
        scratch_dir.to_path_buf(),
    );
    let transcoder = ProcessTranscoder::from_config(&config);
    run_sweep(&config, &transcoder, &LogReporter, None, &CancelFlag::new())
}

/// Creates the output root if needed and checks that it is writable.
fn prepare_output_root(output_root: &Path) -> CoreResult<()> {
    std::fs::create_dir_all(output_root).map_err(|e| {
        CoreError::PathError(format!(
            "Cannot create output root {}: {}",
            output_root.display(),
            e
        ))
    })?;

    TempFileBuilder::new()
        .prefix(".adder_sweep_probe")
        .tempfile_in(output_root)
        .map_err(|e| {
            CoreError::PathError(format!(
                "Output root {} is not writable: {}",
                output_root.display(),
                e
            ))
        })?;

    Ok(())
}

/// Runs every threshold of one asset.
fn sweep_asset<T: Transcoder + ?Sized>(
    config: &SweepConfig,
    transcoder: &T,
    scratch: &mut ScratchSpace,
    asset: &Asset,
    thresholds: &[u32],
    reporter: &dyn Reporter,
    cancel: &CancelFlag,
) -> CoreResult<AssetReport> {
    let output_dir = asset.output_dir(&config.output_root);
    let mut asset_report = AssetReport {
        asset: asset.as_str().to_string(),
        output_dir: output_dir.clone(),
        status: AssetStatus::Completed,
        invocations: Vec::with_capacity(thresholds.len()),
    };

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        log::error!(
            "Cannot create log directory {} for {}: {}; skipping asset",
            output_dir.display(),
            asset,
            e
        );
        asset_report.status = AssetStatus::Skipped {
            reason: format!("cannot create {}: {}", output_dir.display(), e),
        };
        return Ok(asset_report);
    }

    for &threshold in thresholds {
        cancel.check("cancelled before the next invocation")?;

        let record = run_invocation(
            config,
            transcoder,
            scratch,
            asset,
            threshold,
            &output_dir,
            reporter,
        )?;
        reporter.invocation_finished(&record);

        let timed_out = matches!(record.outcome, InvocationOutcome::TimedOut { .. });
        asset_report.invocations.push(record);

        if timed_out {
            let abandoned = thresholds.iter().filter(|&&t| t > threshold).count();
            log::warn!(
                "{} timed out at threshold {}; abandoning {} remaining threshold(s)",
                asset,
                threshold,
                abandoned
            );
            asset_report.status = AssetStatus::Aborted {
                reason: format!(
                    "timed out at threshold {threshold}; {abandoned} threshold(s) not run"
                ),
            };
            break;
        }
    }

    Ok(asset_report)
}

/// Runs one (asset, threshold) invocation and records its outcome.
fn run_invocation<T: Transcoder + ?Sized>(
    config: &SweepConfig,
    transcoder: &T,
    scratch: &mut ScratchSpace,
    asset: &Asset,
    threshold: u32,
    output_dir: &Path,
    reporter: &dyn Reporter,
) -> CoreResult<InvocationRecord> {
    let log_path: PathBuf = output_dir.join(config.log_file_name(threshold));
    let lease = scratch.lease(asset, threshold)?;
    let run = RunConfiguration::new(config, asset, threshold, lease.path().to_path_buf());

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| {
            CoreError::PathError(format!(
                "Cannot open run log {}: {}",
                log_path.display(),
                e
            ))
        })?;

    log::info!("Asset: {}  Threshold: {}", asset, threshold);
    reporter.invocation_started(&run, &log_path);

    let start = Instant::now();
    let outcome = match transcoder.run(&run, log_file, config.invocation_timeout) {
        Ok(RunStatus::Exited { code: Some(0) }) => InvocationOutcome::Succeeded,
        Ok(RunStatus::Exited { code }) => InvocationOutcome::Failed { exit_code: code },
        Ok(RunStatus::TimedOut { after }) => InvocationOutcome::TimedOut {
            after_secs: after.as_secs_f64(),
        },
        Err(e) => {
            log::error!("Invocation for {} at {} failed: {}", asset, threshold, e);
            InvocationOutcome::SpawnFailed {
                message: e.to_string(),
            }
        }
    };
    let elapsed_secs = start.elapsed().as_secs_f64();

    // Releases the scratch space; per-run events files are removed here.
    drop(lease);

    Ok(InvocationRecord {
        asset: asset.as_str().to_string(),
        threshold,
        log_path,
        outcome,
        elapsed_secs,
    })
}
