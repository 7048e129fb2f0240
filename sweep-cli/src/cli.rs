// adder-sweep/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "adder-sweep: ADDER contrast threshold sweep harness",
    long_about = "Runs the ADDER transcoder once per (asset, threshold) pair and keeps one log per run."
)]
pub struct Cli {
    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Optional: Directory for the controller log (defaults to OUTPUT_ROOT)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Do not write a controller log file
    #[arg(long, default_value_t = false)]
    pub no_log: bool,

    /// Enable verbose output for troubleshooting
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Directory containing the assets named in the manifest
    #[arg(required = true, value_name = "DATASET_ROOT")]
    pub dataset_root: PathBuf,

    /// Text file listing one asset per line, relative to DATASET_ROOT
    #[arg(required = true, value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Directory receiving one log directory per asset
    #[arg(required = true, value_name = "OUTPUT_ROOT")]
    pub output_root: PathBuf,

    /// Largest contrast threshold to sweep, inclusive
    #[arg(required = true, value_name = "MAX_THRESHOLD")]
    pub max_threshold: u32,

    /// Directory for the transcoder's intermediate events file
    #[arg(required = true, value_name = "SCRATCH_DIR")]
    pub scratch_dir: PathBuf,

    // --- Transcoder ---
    /// Transcoder executable, looked up on PATH
    #[arg(
        long,
        value_name = "PROGRAM",
        env = "ADDER_SWEEP_TRANSCODER",
        default_value = adder_sweep_core::config::DEFAULT_TRANSCODER_PROGRAM
    )]
    pub transcoder: String,

    /// Argument placed before the per-run arguments (repeatable),
    /// e.g. --transcoder cargo --transcoder-arg run --transcoder-arg --release
    #[arg(long = "transcoder-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub transcoder_args: Vec<String>,

    /// Kill an invocation that runs longer than this many seconds and
    /// abandon the rest of its asset
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    // --- Pacing ---
    /// Pause between assets, in seconds
    #[arg(long, value_name = "SECONDS", env = "ADDER_SWEEP_COOLDOWN_SECS", default_value_t = 60)]
    pub cooldown_secs: u64,

    /// Give every run its own events file instead of sharing one
    #[arg(long, default_value_t = false)]
    pub per_run_scratch: bool,

    // --- Output ---
    /// Emit one JSON progress event per line on stdout instead of terminal output
    #[arg(long, default_value_t = false)]
    pub progress_json: bool,

    /// Optional: Write the end-of-sweep summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,

    // --- Notifications ---
    /// Optional: ntfy.sh topic URL for sending notifications (e.g., https://ntfy.sh/your_topic)
    /// Can also be set via the ADDER_SWEEP_NTFY_TOPIC environment variable.
    #[arg(long, value_name = "TOPIC_URL", env = "ADDER_SWEEP_NTFY_TOPIC")]
    pub ntfy: Option<String>,
}

impl Cli {
    /// Directory for the controller log. Defaults to the output root, beside
    /// the asset directories and never inside one.
    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.sweep.output_root.clone())
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses from an explicit argument list. Used by tests.
pub fn parse_cli_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
