// adder-sweep/src/lib.rs
//
// Library portion of the adder-sweep CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, SweepArgs, parse_cli, parse_cli_from};
pub use commands::sweep::run_sweep_command;
pub use error::{CliErrorContext, CliResult};
