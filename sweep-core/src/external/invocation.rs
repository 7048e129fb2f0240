// ============================================================================
// sweep-core/src/external/invocation.rs
// ============================================================================
//
// RUN CONFIGURATION: One (asset, threshold) transcoder invocation
//
// Everything a single invocation needs, fully determined by the sweep
// configuration, the asset, the threshold and the scratch events path. The
// command line is derived from it with `to_args`, so identical inputs always
// produce identical command lines.

use crate::config::deblur::format_float;
use crate::config::{DeblurConfig, SweepConfig};
use crate::manifest::Asset;

use std::ffi::OsString;
use std::path::PathBuf;

/// Value object describing one transcoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    /// Directory the asset is resolved against
    pub dataset_root: PathBuf,
    /// The asset being transcoded
    pub asset: Asset,
    /// Contrast threshold, applied to both polarities
    pub threshold: u32,
    /// Bound on an event's delta t, as a multiple of the reference time
    pub delta_t_max_multiplier: f64,
    /// Reference time in ticks
    pub reference_time: u32,
    /// Source format selector
    pub transcode_from: String,
    /// Fixed deblurring sub-configuration
    pub deblur: DeblurConfig,
    /// Where the transcoder writes its events
    pub events_path: PathBuf,
}

impl RunConfiguration {
    /// Builds the configuration for `(asset, threshold)` under `config`.
    pub fn new(config: &SweepConfig, asset: &Asset, threshold: u32, events_path: PathBuf) -> Self {
        Self {
            dataset_root: config.dataset_root.clone(),
            asset: asset.clone(),
            threshold,
            delta_t_max_multiplier: config.delta_t_max_multiplier,
            reference_time: config.reference_time,
            transcode_from: config.transcode_from.clone(),
            deblur: config.deblur.clone(),
            events_path,
        }
    }

    /// Positive polarity threshold.
    pub fn c_thresh_pos(&self) -> u32 {
        self.threshold
    }

    /// Negative polarity threshold. Always equal to the positive one.
    pub fn c_thresh_neg(&self) -> u32 {
        self.threshold
    }

    /// The `--edi-args` block.
    pub fn deblur_block(&self) -> String {
        self.deblur
            .to_args_block(&self.dataset_root, self.asset.as_str())
    }

    /// Per-run transcoder arguments, placed after any leading arguments.
    pub fn to_args(&self) -> Vec<OsString> {
        vec![
            "--edi-args".into(),
            self.deblur_block().into(),
            "--output-events-filename".into(),
            self.events_path.clone().into_os_string(),
            "--c-thresh-pos".into(),
            self.c_thresh_pos().to_string().into(),
            "--c-thresh-neg".into(),
            self.c_thresh_neg().to_string().into(),
            "--delta-t-max-multiplier".into(),
            format_float(self.delta_t_max_multiplier).into(),
            "--transcode-from".into(),
            self.transcode_from.clone().into(),
            "--write-out".into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_for(threshold: u32) -> RunConfiguration {
        let config = SweepConfig::new(
            PathBuf::from("/data/davis"),
            PathBuf::from("/data/davis/manifest.txt"),
            PathBuf::from("/out"),
            20,
            PathBuf::from("/scratch"),
        );
        let asset = Asset::new("clipA.aedat4").unwrap();
        RunConfiguration::new(&config, &asset, threshold, PathBuf::from("/scratch/tmp_events.adder"))
    }

    #[test]
    fn test_args_layout() {
        let args: Vec<String> = run_for(20)
            .to_args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args.len(), 13);
        assert_eq!(args[0], "--edi-args");
        assert!(args[1].starts_with("args_filename=\"\"\nbase_path=\"/data/davis\""));
        assert_eq!(&args[2..4], ["--output-events-filename", "/scratch/tmp_events.adder"]);
        assert_eq!(&args[4..8], ["--c-thresh-pos", "20", "--c-thresh-neg", "20"]);
        assert_eq!(&args[8..10], ["--delta-t-max-multiplier", "4.0"]);
        assert_eq!(&args[10..12], ["--transcode-from", "davis"]);
        assert_eq!(args[12], "--write-out");
    }

    #[test]
    fn test_identical_inputs_give_identical_args() {
        assert_eq!(run_for(10).to_args(), run_for(10).to_args());
        assert_ne!(run_for(10).to_args(), run_for(20).to_args());
    }

    #[test]
    fn test_polarities_match() {
        let run = run_for(30);
        assert_eq!(run.c_thresh_pos(), run.c_thresh_neg());
        assert_eq!(run.c_thresh_pos(), 30);
    }
}
