// adder-sweep/src/main.rs
//
// Entry point for the adder-sweep binary.
//
// Parses the arguments, installs logging, runs the sweep and maps the
// outcome to an exit status: 0 once the sweep has run to completion, however
// many individual runs failed, and 1 for setup or controller errors.

use adder_sweep::logging::{ControllerLog, controller_log_path, init_logging};
use adder_sweep::{Cli, parse_cli, run_sweep_command};
use std::process;

fn main() {
    let cli = parse_cli();

    let controller_log = match setup_logging(&cli) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    match run_sweep_command(&cli.sweep, controller_log.as_ref()) {
        Ok(report) => {
            log::debug!(
                "Sweep finished: {} succeeded, {} failed",
                report.succeeded(),
                report.failed()
            );
        }
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(cli: &Cli) -> anyhow::Result<Option<ControllerLog>> {
    let controller_log = if cli.no_log {
        None
    } else {
        Some(ControllerLog::new(controller_log_path(&cli.effective_log_dir())))
    };

    init_logging(cli.verbose, controller_log.as_ref(), cli.sweep.progress_json)?;
    Ok(controller_log)
}
