//! The scratch file used to stage data between the filesystem and the
//! cipher primitive.
//!
//! A batch run owns exactly one [`ScratchFile`]. Every file in the run is
//! staged through the same path, so files must be processed one at a time.
//! The path is removed when the guard is dropped, whether the run
//! succeeded or not.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::file_ops;

#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Claims `path` for the lifetime of the returned guard. Nothing is
    /// created on disk until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the scratch contents with `bytes`.
    pub fn stage(&self, bytes: &[u8]) -> Result<()> {
        file_ops::write_file_secure(&self.path, bytes)
    }

    /// Empties the scratch file, creating it if needed.
    pub fn reset(&self) -> Result<()> {
        file_ops::create_or_truncate(&self.path)
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        file_ops::read_file(&self.path)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove scratch file"
            ),
        }
    }
}
