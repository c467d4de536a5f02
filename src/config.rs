//! File locations for a batch run

use std::path::{Path, PathBuf};

pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";
pub const DEFAULT_MANIFEST: &str = "encrypted.json";
pub const DEFAULT_SCRATCH: &str = "multi-encrypt-tempfile";

/// Where a batch run reads and writes
///
/// `ignore_file`, `manifest`, `scratch` and every candidate path are
/// resolved against `root` unless already absolute. Manifest keys stay
/// relative to `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub root: PathBuf,
    pub ignore_file: PathBuf,
    pub manifest: PathBuf,
    pub scratch: PathBuf,
}

impl BatchConfig {
    /// Default file names inside `root`
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn ignore_file_path(&self) -> PathBuf {
        self.resolve(&self.ignore_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.resolve(&self.scratch)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignore_file: PathBuf::from(DEFAULT_IGNORE_FILE),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            scratch: PathBuf::from(DEFAULT_SCRATCH),
        }
    }
}
