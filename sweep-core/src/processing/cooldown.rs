//! Pacing between assets and cooperative cancellation.

use crate::error::{CoreError, CoreResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep while cooling down.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Shared cancellation request.
///
/// Cloning yields a handle to the same flag, so one clone can be handed to a
/// signal handler or another thread while the sweep polls the other. A
/// running invocation is never interrupted; the flag is honoured before the
/// next invocation starts and during the cooldown.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(CoreError::Interrupted)` if cancellation was requested.
    pub fn check(&self, context: &str) -> CoreResult<()> {
        if self.is_cancelled() {
            Err(CoreError::Interrupted(context.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Sleeps for `duration`, waking periodically to honour `cancel`.
///
/// # Errors
///
/// * `CoreError::Interrupted` if cancellation is requested before the
///   cooldown has elapsed
pub fn cool_down(duration: Duration, cancel: &CancelFlag) -> CoreResult<()> {
    let start = Instant::now();

    loop {
        cancel.check("cancelled during cooldown")?;

        let elapsed = start.elapsed();
        if elapsed >= duration {
            return Ok(());
        }
        std::thread::sleep(CANCEL_CHECK_INTERVAL.min(duration - elapsed));
    }
}
