// ============================================================================
// sweep-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for SweepConfig
//
// This module implements the builder pattern for SweepConfig. The five sweep
// inputs are required; every other field starts at the legacy harness value.
// `build` validates the result instead of panicking on missing fields.

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::{DeblurConfig, ScratchMode, SweepConfig};
use crate::error::{CoreError, CoreResult};

/// Builder for creating SweepConfig instances.
///
/// # Examples
///
/// ```rust
/// use adder_sweep_core::config::{ScratchMode, SweepConfigBuilder};
/// use std::path::PathBuf;
///
/// let config = SweepConfigBuilder::new()
///     .dataset_root(PathBuf::from("/data"))
///     .manifest_path(PathBuf::from("/data/manifest.txt"))
///     .output_root(PathBuf::from("/out"))
///     .max_threshold(50)
///     .scratch_dir(PathBuf::from("/tmp"))
///     .scratch_mode(ScratchMode::PerRun)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.thresholds().len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct SweepConfigBuilder {
    // Required fields
    dataset_root: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
    output_root: Option<PathBuf>,
    max_threshold: Option<u32>,
    scratch_dir: Option<PathBuf>,

    // Optional fields with defaults
    threshold_step: u32,
    reference_time: u32,
    delta_t_max_multiplier: f64,
    cooldown: Duration,
    invocation_timeout: Option<Duration>,
    scratch_mode: ScratchMode,
    transcoder_program: String,
    transcoder_args: Vec<String>,
    transcode_from: String,
    deblur: DeblurConfig,
    ntfy_topic: Option<String>,
}

impl Default for SweepConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepConfigBuilder {
    /// Creates a new builder with the legacy harness defaults.
    pub fn new() -> Self {
        Self {
            dataset_root: None,
            manifest_path: None,
            output_root: None,
            max_threshold: None,
            scratch_dir: None,

            threshold_step: super::DEFAULT_THRESHOLD_STEP,
            reference_time: super::DEFAULT_REFERENCE_TIME,
            delta_t_max_multiplier: super::DEFAULT_DELTA_T_MAX_MULTIPLIER,
            cooldown: super::DEFAULT_COOLDOWN,
            invocation_timeout: None,
            scratch_mode: ScratchMode::default(),
            transcoder_program: super::DEFAULT_TRANSCODER_PROGRAM.to_string(),
            transcoder_args: Vec::new(),
            transcode_from: super::DEFAULT_TRANSCODE_FROM.to_string(),
            deblur: DeblurConfig::default(),
            ntfy_topic: None,
        }
    }

    /// Sets the directory containing the manifest's assets.
    pub fn dataset_root(mut self, dataset_root: PathBuf) -> Self {
        self.dataset_root = Some(dataset_root);
        self
    }

    /// Sets the manifest file.
    pub fn manifest_path(mut self, manifest_path: PathBuf) -> Self {
        self.manifest_path = Some(manifest_path);
        self
    }

    /// Sets the directory receiving the per-asset log directories.
    pub fn output_root(mut self, output_root: PathBuf) -> Self {
        self.output_root = Some(output_root);
        self
    }

    /// Sets the largest threshold swept (inclusive).
    pub fn max_threshold(mut self, max_threshold: u32) -> Self {
        self.max_threshold = Some(max_threshold);
        self
    }

    /// Sets the scratch directory for intermediate event files.
    pub fn scratch_dir(mut self, scratch_dir: PathBuf) -> Self {
        self.scratch_dir = Some(scratch_dir);
        self
    }

    /// Overrides the threshold step.
    pub fn threshold_step(mut self, step: u32) -> Self {
        self.threshold_step = step;
        self
    }

    /// Overrides the reference time.
    pub fn reference_time(mut self, reference_time: u32) -> Self {
        self.reference_time = reference_time;
        self
    }

    /// Overrides the delta t max multiplier.
    pub fn delta_t_max_multiplier(mut self, multiplier: f64) -> Self {
        self.delta_t_max_multiplier = multiplier;
        self
    }

    /// Sets the pause between assets.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets a per-invocation timeout. Without one, a hung transcoder blocks
    /// the sweep indefinitely.
    pub fn invocation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.invocation_timeout = timeout;
        self
    }

    /// Sets the scratch file allocation policy.
    pub fn scratch_mode(mut self, mode: ScratchMode) -> Self {
        self.scratch_mode = mode;
        self
    }

    /// Sets the transcoder executable.
    pub fn transcoder_program(mut self, program: &str) -> Self {
        self.transcoder_program = program.to_string();
        self
    }

    /// Sets the arguments placed before the per-run arguments.
    pub fn transcoder_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transcoder_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the source format selector.
    pub fn transcode_from(mut self, source: &str) -> Self {
        self.transcode_from = source.to_string();
        self
    }

    /// Replaces the deblurring sub-configuration.
    pub fn deblur(mut self, deblur: DeblurConfig) -> Self {
        self.deblur = deblur;
        self
    }

    /// Sets the ntfy.sh topic URL for sending notifications.
    pub fn ntfy_topic(mut self, topic: &str) -> Self {
        self.ntfy_topic = Some(topic.to_string());
        self
    }

    /// Builds and validates a SweepConfig.
    ///
    /// # Errors
    ///
    /// * `CoreError::Config` if a required field is missing or a value is invalid
    pub fn build(self) -> CoreResult<SweepConfig> {
        let config = SweepConfig {
            dataset_root: required(self.dataset_root, "dataset_root")?,
            manifest_path: required(self.manifest_path, "manifest_path")?,
            output_root: required(self.output_root, "output_root")?,
            max_threshold: required(self.max_threshold, "max_threshold")?,
            scratch_dir: required(self.scratch_dir, "scratch_dir")?,
            threshold_step: self.threshold_step,
            reference_time: self.reference_time,
            delta_t_max_multiplier: self.delta_t_max_multiplier,
            cooldown: self.cooldown,
            invocation_timeout: self.invocation_timeout,
            scratch_mode: self.scratch_mode,
            transcoder_program: self.transcoder_program,
            transcoder_args: self.transcoder_args,
            transcode_from: self.transcode_from,
            deblur: self.deblur,
            ntfy_topic: self.ntfy_topic,
        };

        config.validate()?;
        Ok(config)
    }
}

fn required<T>(value: Option<T>, name: &str) -> CoreResult<T> {
    value.ok_or_else(|| CoreError::Config(format!("{name} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_sweep_inputs() {
        let result = SweepConfigBuilder::new()
            .dataset_root(PathBuf::from("/data"))
            .output_root(PathBuf::from("/out"))
            .build();

        match result {
            Err(CoreError::Config(msg)) => assert!(msg.contains("manifest_path")),
            other => panic!("Expected missing manifest_path error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_applies_overrides() {
        let config = SweepConfigBuilder::new()
            .dataset_root(PathBuf::from("/data"))
            .manifest_path(PathBuf::from("/data/list.txt"))
            .output_root(PathBuf::from("/out"))
            .max_threshold(40)
            .scratch_dir(PathBuf::from("/scratch"))
            .cooldown(Duration::ZERO)
            .invocation_timeout(Some(Duration::from_secs(600)))
            .transcoder_program("cargo")
            .transcoder_args(["run", "--release", "--bin", "adder_simulproc", "--"])
            .ntfy_topic("https://ntfy.sh/sweeps")
            .build()
            .expect("valid config");

        assert_eq!(config.max_threshold, 40);
        assert_eq!(config.cooldown, Duration::ZERO);
        assert_eq!(config.invocation_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.transcoder_program, "cargo");
        assert_eq!(config.transcoder_args.len(), 5);
        assert_eq!(config.ntfy_topic.as_deref(), Some("https://ntfy.sh/sweeps"));
    }

    #[test]
    fn test_build_rejects_invalid_values() {
        let result = SweepConfigBuilder::new()
            .dataset_root(PathBuf::from("/data"))
            .manifest_path(PathBuf::from("/data/list.txt"))
            .output_root(PathBuf::from("/out"))
            .max_threshold(40)
            .scratch_dir(PathBuf::from("/scratch"))
            .delta_t_max_multiplier(-1.0)
            .build();

        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
