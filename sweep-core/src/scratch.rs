//! Ownership of the scratch directory the transcoder writes its events into.
//!
//! In the shared mode every invocation writes the same file, so at most one
//! invocation may hold the scratch space at a time. That is enforced by
//! handing out a [`ScratchLease`] that mutably borrows the [`ScratchSpace`]
//! for the duration of one run.

use crate::config::{SCRATCH_EVENTS_FILENAME, ScratchMode};
use crate::error::{CoreResult, scratch_error};
use crate::manifest::Asset;

use std::io;
use std::path::{Path, PathBuf};
use tempfile::Builder as TempFileBuilder;

/// The scratch directory, owned by the sweep controller.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: PathBuf,
    mode: ScratchMode,
}

impl ScratchSpace {
    /// Creates the directory if needed and checks that it is writable.
    ///
    /// # Errors
    ///
    /// * `CoreError::Scratch` if the directory cannot be created or written
    pub fn prepare(dir: &Path, mode: ScratchMode) -> CoreResult<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| scratch_error(dir, format!("cannot create directory: {e}")))?;

        // Dropping the probe deletes it.
        TempFileBuilder::new()
            .prefix(".adder_sweep_probe")
            .tempfile_in(dir)
            .map_err(|e| scratch_error(dir, format!("directory is not writable: {e}")))?;

        log::debug!("Scratch directory ready: {} ({:?})", dir.display(), mode);
        Ok(Self {
            dir: dir.to_path_buf(),
            mode,
        })
    }

    /// The scratch directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The allocation policy.
    pub fn mode(&self) -> ScratchMode {
        self.mode
    }

    /// Path the events of `(asset, threshold)` are written to.
    pub fn events_path(&self, asset: &Asset, threshold: u32) -> PathBuf {
        match self.mode {
            ScratchMode::Shared => self.dir.join(SCRATCH_EVENTS_FILENAME),
            ScratchMode::PerRun => self
                .dir
                .join(format!("{}_{}_events.adder", asset.slug(), threshold)),
        }
    }

    /// Reserves the scratch space for one invocation.
    ///
    /// # Errors
    ///
    /// * `CoreError::Scratch` if the directory has disappeared since the
    ///   sweep started
    pub fn lease(&mut self, asset: &Asset, threshold: u32) -> CoreResult<ScratchLease<'_>> {
        if !self.dir.is_dir() {
            return Err(scratch_error(
                &self.dir,
                "directory no longer exists",
            ));
        }

        let path = self.events_path(asset, threshold);
        Ok(ScratchLease { space: self, path })
    }
}

/// Exclusive use of the scratch space for one invocation.
///
/// In per-run mode the events file is removed when the lease is dropped,
/// which happens once the invocation's output has been captured.
#[derive(Debug)]
pub struct ScratchLease<'a> {
    space: &'a mut ScratchSpace,
    path: PathBuf,
}

impl ScratchLease<'_> {
    /// Path the transcoder should write its events to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchLease<'_> {
    fn drop(&mut self) {
        if self.space.mode != ScratchMode::PerRun {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed scratch events file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove scratch events file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
