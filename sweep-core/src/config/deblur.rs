//! Deblurring sub-configuration handed to the transcoder via `--edi-args`.
//!
//! The transcoder runs an event-based double integral (EDI) deblurring front
//! end before generating events. Its settings travel as one string argument
//! holding `key="value"` lines. Everything except the dataset root and the
//! asset name is constant across a sweep.

use std::fmt::Write as _;
use std::path::Path;

/// Fixed deblurring parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DeblurConfig {
    /// How the deblur front end reads its input (`file` or `socket`)
    pub mode: String,
    /// Initial contrast value for the EDI optimizer
    pub start_c: f64,
    /// Optimize the contrast value while running
    pub optimize_c: bool,
    /// Let the latency controller adjust the optimization rate
    pub optimize_controller: bool,
    /// Only produce deblurred frames
    pub deblur_only: bool,
    /// Only forward raw events
    pub events_only: bool,
    /// Simulate packet arrival latency of a live camera
    pub simulate_packet_latency: bool,
    /// Target latency in milliseconds for the simulated packets
    pub target_latency: f64,
    /// Show the deblurred live view
    pub show_display: bool,
    /// Show the blurred input live view
    pub show_blurred_display: bool,
    /// Frame rate of the deblurred output
    pub output_fps: f64,
    /// Write the deblurred frames to a video file
    pub write_video: bool,
}

impl Default for DeblurConfig {
    fn default() -> Self {
        Self {
            mode: "file".to_string(),
            start_c: 0.3,
            optimize_c: true,
            optimize_controller: false,
            deblur_only: true,
            events_only: false,
            simulate_packet_latency: true,
            target_latency: 1000.0,
            show_display: false,
            show_blurred_display: false,
            output_fps: 1000.0,
            write_video: false,
        }
    }
}

impl DeblurConfig {
    /// Key/value pairs in the order the block is written.
    pub fn entries(&self, dataset_root: &Path, asset: &str) -> Vec<(&'static str, String)> {
        vec![
            ("args_filename", String::new()),
            ("base_path", dataset_root.to_string_lossy().into_owned()),
            ("mode", self.mode.clone()),
            ("events_filename_0", asset.to_string()),
            ("events_filename_1", String::new()),
            ("start_c", format_float(self.start_c)),
            ("optimize_c", self.optimize_c.to_string()),
            ("optimize_controller", self.optimize_controller.to_string()),
            ("deblur_only", self.deblur_only.to_string()),
            ("events_only", self.events_only.to_string()),
            (
                "simulate_packet_latency",
                self.simulate_packet_latency.to_string(),
            ),
            ("target_latency", format_float(self.target_latency)),
            ("show_display", self.show_display.to_string()),
            ("show_blurred_display", self.show_blurred_display.to_string()),
            ("output_fps", format_float(self.output_fps)),
            ("write_video", self.write_video.to_string()),
        ]
    }

    /// Renders the `--edi-args` value: one `key="value"` line per entry.
    pub fn to_args_block(&self, dataset_root: &Path, asset: &str) -> String {
        let mut block = String::new();
        for (i, (key, value)) in self.entries(dataset_root, asset).iter().enumerate() {
            if i > 0 {
                block.push('\n');
            }
            // Writing into a String cannot fail.
            let _ = write!(block, "{key}=\"{}\"", escape(value));
        }
        block
    }
}

/// Formats a float so it always carries a decimal point (`1000.0`, `0.3`).
pub(crate) fn format_float(value: f64) -> String {
    let rendered = value.to_string();
    if value.is_finite() && !rendered.contains('.') && !rendered.contains('e') {
        format!("{rendered}.0")
    } else {
        rendered
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let block = DeblurConfig::default().to_args_block(Path::new("/data/davis"), "clipA.aedat4");
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "args_filename=\"\"");
        assert_eq!(lines[1], "base_path=\"/data/davis\"");
        assert_eq!(lines[2], "mode=\"file\"");
        assert_eq!(lines[3], "events_filename_0=\"clipA.aedat4\"");
        assert_eq!(lines[5], "start_c=\"0.3\"");
        assert_eq!(lines[6], "optimize_c=\"true\"");
        assert_eq!(lines[7], "optimize_controller=\"false\"");
        assert_eq!(lines[8], "deblur_only=\"true\"");
        assert_eq!(lines[10], "simulate_packet_latency=\"true\"");
        assert_eq!(lines[11], "target_latency=\"1000.0\"");
        assert_eq!(lines[12], "show_display=\"false\"");
        assert_eq!(lines[14], "output_fps=\"1000.0\"");
        assert!(!block.ends_with('\n'));
    }

    #[test]
    fn test_block_escapes_quotes() {
        let block = DeblurConfig::default().to_args_block(Path::new("/data"), "odd\"name");
        assert!(block.contains("events_filename_0=\"odd\\\"name\""));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(4.0), "4.0");
        assert_eq!(format_float(0.3), "0.3");
        assert_eq!(format_float(1000.0), "1000.0");
        assert_eq!(format_float(2.5), "2.5");
    }
}
