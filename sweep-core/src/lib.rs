//! Core library for sweeping ADDER transcoder contrast thresholds.
//!
//! This crate reads an asset manifest, runs an external event-stream
//! transcoder once per (asset, threshold) pair with a reproducible
//! configuration, appends each run's output to a log keyed by asset,
//! threshold and reference time, and paces the sweep with a cooldown
//! between assets.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use adder_sweep_core::config::{ScratchMode, SweepConfigBuilder};
//! use adder_sweep_core::external::ProcessTranscoder;
//! use adder_sweep_core::notifications::NtfyNotificationSender;
//! use adder_sweep_core::processing::CancelFlag;
//! use adder_sweep_core::reporting::TerminalReporter;
//! use adder_sweep_core::run_sweep;
//! use std::path::PathBuf;
//!
//! let config = SweepConfigBuilder::new()
//!     .dataset_root(PathBuf::from("/data/davis"))
//!     .manifest_path(PathBuf::from("/data/davis/manifest.txt"))
//!     .output_root(PathBuf::from("/results"))
//!     .max_threshold(100)
//!     .scratch_dir(PathBuf::from("/tmp"))
//!     .scratch_mode(ScratchMode::PerRun)
//!     .build()
//!     .unwrap();
//!
//! let transcoder = ProcessTranscoder::from_config(&config);
//! let notifier = NtfyNotificationSender::new("https://ntfy.sh/my-topic").unwrap();
//!
//! let report = run_sweep(
//!     &config,
//!     &transcoder,
//!     &TerminalReporter::new(),
//!     Some(&notifier),
//!     &CancelFlag::new(),
//! )
//! .unwrap();
//! println!("{} of {} succeeded", report.succeeded(), report.total_invocations());
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod manifest;
pub mod notifications;
pub mod processing;
pub mod reporting;
pub mod scratch;
pub mod thresholds;
pub mod utils;

// Re-exports for public API
pub use config::{ScratchMode, SweepConfig, SweepConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use manifest::{Asset, read_manifest};
pub use processing::{CancelFlag, run_sweep, run_sweep_with_defaults};
pub use reporting::{InvocationOutcome, InvocationRecord, SweepReport};
pub use thresholds::ThresholdRange;
pub use utils::format_duration;
