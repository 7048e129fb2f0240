// ============================================================================
// sweep-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interaction with the transcoder executable
//
// The transcoder is a black box reached only through its command line. This
// module builds that command line from a run configuration, runs it with its
// output appended to a log file, and checks that the executable exists before
// a sweep starts.
//
// KEY COMPONENTS:
// - RunConfiguration: the per-(asset, threshold) value object and its arguments
// - Transcoder: the trait seam the sweep controller runs invocations through
// - ProcessTranscoder: the std::process implementation
// - mocks: a scripted Transcoder for tests

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::path::PathBuf;

// ============================================================================
// SUBMODULES
// ============================================================================

/// Per-run value object and transcoder argument building
pub mod invocation;

/// Trait and process-backed implementation for running the transcoder
pub mod transcoder;

/// Scripted transcoder used by the test suites
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use invocation::RunConfiguration;
pub use transcoder::{ProcessTranscoder, RunStatus, Transcoder};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Resolves `program` to an executable, searching `PATH` when it is a bare name.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The resolved executable
/// * `Err(CoreError::DependencyNotFound)` - If no executable could be found
pub fn check_transcoder(program: &str) -> CoreResult<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found transcoder '{}' at {}", program, path.display());
            Ok(path)
        }
        Err(e) => {
            log::warn!("Transcoder '{}' not found: {}", program, e);
            Err(CoreError::DependencyNotFound(program.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_dependency_error() {
        let result = check_transcoder("adder-sweep-definitely-not-installed-xyz");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(name)) if name.contains("xyz")));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_resolves() {
        let path = check_transcoder("/bin/sh").expect("/bin/sh should exist");
        assert!(path.is_absolute());
    }
}
