//! Configuration structures and constants for the sweep controller.
//!
//! This module provides the configuration for one sweep: the five inputs that
//! define it (dataset root, manifest, output root, maximum threshold, scratch
//! directory) plus the fixed transcoder parameters and pacing options.

mod builder;
pub mod deblur;

use std::path::PathBuf;
use std::time::Duration;

pub use builder::SweepConfigBuilder;
pub use deblur::DeblurConfig;

use crate::error::{CoreError, CoreResult};
use crate::thresholds::ThresholdRange;

// Default constants

/// Distance between consecutive swept thresholds.
pub const DEFAULT_THRESHOLD_STEP: u32 = 10;

/// Reference time handed to the transcoder, in ticks of the capture's
/// native clock (microseconds for DAVIS recordings).
pub const DEFAULT_REFERENCE_TIME: u32 = 1_000_000;

/// Multiplier applied to the reference time to bound an event's delta t.
pub const DEFAULT_DELTA_T_MAX_MULTIPLIER: f64 = 4.0;

/// Pause between two assets so the transcoder's GPU, disk and thermal
/// state can settle.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Transcoder executable looked up on `PATH` when none is configured.
pub const DEFAULT_TRANSCODER_PROGRAM: &str = "adder_simulproc";

/// Upper bound on the number of thresholds swept per asset. Every threshold
/// is one transcoder run per asset, and the plan and report hold the whole
/// list.
pub const MAX_THRESHOLD_COUNT: usize = 10_000;

/// Source format selector passed as `--transcode-from`.
pub const DEFAULT_TRANSCODE_FROM: &str = "davis";

/// Name of the events file shared by every invocation in the legacy
/// scratch mode.
pub const SCRATCH_EVENTS_FILENAME: &str = "tmp_events.adder";

/// How invocations use the scratch directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScratchMode {
    /// Every invocation overwrites `scratch_dir/tmp_events.adder`.
    #[default]
    Shared,
    /// Each (asset, threshold) pair gets its own events file, removed once
    /// the invocation has finished.
    PerRun,
}

/// Main configuration structure for one sweep.
///
/// Created by the consumer of the library (e.g. the `adder-sweep` binary)
/// and passed to [`run_sweep`](crate::run_sweep). Only the five sweep inputs
/// are required; everything else defaults to the legacy harness values.
///
/// # Examples
///
/// ```rust,no_run
/// use adder_sweep_core::config::SweepConfigBuilder;
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let config = SweepConfigBuilder::new()
///     .dataset_root(PathBuf::from("/data/davis"))
///     .manifest_path(PathBuf::from("/data/davis/manifest.txt"))
///     .output_root(PathBuf::from("/results/logs"))
///     .max_threshold(100)
///     .scratch_dir(PathBuf::from("/tmp"))
///     .cooldown(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Directory containing every asset named in the manifest
    pub dataset_root: PathBuf,

    /// Manifest listing one asset per line
    pub manifest_path: PathBuf,

    /// Directory receiving one log subdirectory per asset
    pub output_root: PathBuf,

    /// Largest threshold swept, inclusive
    pub max_threshold: u32,

    /// Directory for the transcoder's intermediate event output
    pub scratch_dir: PathBuf,

    /// Distance between consecutive thresholds
    pub threshold_step: u32,

    /// Reference time, also part of each run log's file name
    pub reference_time: u32,

    /// Delta t max multiplier passed to the transcoder
    pub delta_t_max_multiplier: f64,

    /// Pause between assets
    pub cooldown: Duration,

    /// Kill an invocation that runs longer than this. `None` waits forever.
    pub invocation_timeout: Option<Duration>,

    /// Scratch file allocation policy
    pub scratch_mode: ScratchMode,

    /// Transcoder executable
    pub transcoder_program: String,

    /// Arguments placed before the per-run arguments, e.g. `run --release --bin adder_simulproc`
    pub transcoder_args: Vec<String>,

    /// Source format selector
    pub transcode_from: String,

    /// Fixed deblurring sub-configuration
    pub deblur: DeblurConfig,

    /// Optional ntfy.sh topic URL for sending notifications
    pub ntfy_topic: Option<String>,
}

impl SweepConfig {
    /// Creates a configuration from the five sweep inputs with every other
    /// field at its default.
    pub fn new(
        dataset_root: PathBuf,
        manifest_path: PathBuf,
        output_root: PathBuf,
        max_threshold: u32,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            dataset_root,
            manifest_path,
            output_root,
            max_threshold,
            scratch_dir,
            threshold_step: DEFAULT_THRESHOLD_STEP,
            reference_time: DEFAULT_REFERENCE_TIME,
            delta_t_max_multiplier: DEFAULT_DELTA_T_MAX_MULTIPLIER,
            cooldown: DEFAULT_COOLDOWN,
            invocation_timeout: None,
            scratch_mode: ScratchMode::default(),
            transcoder_program: DEFAULT_TRANSCODER_PROGRAM.to_string(),
            transcoder_args: Vec::new(),
            transcode_from: DEFAULT_TRANSCODE_FROM.to_string(),
            deblur: DeblurConfig::default(),
            ntfy_topic: None,
        }
    }

    /// Checks the numeric parameters. Paths are checked when the sweep
    /// prepares its directories.
    pub fn validate(&self) -> CoreResult<()> {
        if self.threshold_step == 0 {
            return Err(CoreError::Config(
                "threshold step must be greater than zero".to_string(),
            ));
        }

        let count = self.thresholds().len();
        if count > MAX_THRESHOLD_COUNT {
            return Err(CoreError::Config(format!(
                "max threshold {} with step {} gives {} thresholds per asset; at most {} are allowed",
                self.max_threshold, self.threshold_step, count, MAX_THRESHOLD_COUNT
            )));
        }

        if self.reference_time == 0 {
            return Err(CoreError::Config(
                "reference time must be greater than zero".to_string(),
            ));
        }

        if !self.delta_t_max_multiplier.is_finite() || self.delta_t_max_multiplier <= 0.0 {
            return Err(CoreError::Config(format!(
                "delta t max multiplier must be a positive number, got {}",
                self.delta_t_max_multiplier
            )));
        }

        if self.transcoder_program.trim().is_empty() {
            return Err(CoreError::Config(
                "transcoder program must not be empty".to_string(),
            ));
        }

        if self.invocation_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::Config(
                "invocation timeout must be greater than zero".to_string(),
            ));
        }

        if self.transcode_from.trim().is_empty() {
            return Err(CoreError::Config(
                "transcode source format must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The thresholds swept for every asset.
    pub fn thresholds(&self) -> ThresholdRange {
        ThresholdRange::new(self.max_threshold, self.threshold_step)
    }

    /// File name of the run log for `threshold`, e.g. `20_1000000.txt`.
    pub fn log_file_name(&self, threshold: u32) -> String {
        format!("{}_{}.txt", threshold, self.reference_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> SweepConfig {
        SweepConfig::new(
            PathBuf::from("/data"),
            PathBuf::from("/data/manifest.txt"),
            PathBuf::from("/out"),
            20,
            PathBuf::from("/tmp"),
        )
    }

    #[test]
    fn test_defaults_match_legacy_harness() {
        let config = sample_config();
        assert_eq!(config.threshold_step, 10);
        assert_eq!(config.reference_time, 1_000_000);
        assert_eq!(config.delta_t_max_multiplier, 4.0);
        assert_eq!(config.cooldown, Duration::from_secs(60));
        assert_eq!(config.scratch_mode, ScratchMode::Shared);
        assert!(config.invocation_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_file_name() {
        let config = sample_config();
        assert_eq!(config.log_file_name(0), "0_1000000.txt");
        assert_eq!(config.log_file_name(20), "20_1000000.txt");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = sample_config();
        config.threshold_step = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = sample_config();
        config.delta_t_max_multiplier = f64::NAN;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = sample_config();
        config.transcoder_program = "  ".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = sample_config();
        config.invocation_timeout = Some(Duration::ZERO);
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_bounds_threshold_count() {
        let mut config = sample_config();
        config.max_threshold = u32::MAX;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        // 0, 10, ..., 99_990 is exactly the limit.
        config.max_threshold = 99_990;
        assert_eq!(config.thresholds().len(), MAX_THRESHOLD_COUNT);
        assert!(config.validate().is_ok());

        config.max_threshold = 99_991;
        assert!(config.validate().is_err());
    }
}
