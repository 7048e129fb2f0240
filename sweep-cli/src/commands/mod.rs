//! Command implementations for the CLI.

/// The sweep itself: arguments in, [`SweepReport`](adder_sweep_core::SweepReport) out.
pub mod sweep;
