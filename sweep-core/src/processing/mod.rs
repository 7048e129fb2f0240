//! Sweep orchestration.
//!
//! This module drives the Cartesian iteration over assets and thresholds,
//! runs each invocation through a [`Transcoder`](crate::external::Transcoder)
//! and paces the sweep between assets.

/// Cooldown between assets and the cancellation flag
pub mod cooldown;

/// The sweep controller
pub mod sweep;

pub use cooldown::{CancelFlag, cool_down};
pub use sweep::{run_sweep, run_sweep_with_defaults};
