//! Filesystem helpers shared by the cipher primitive and the batch
//! orchestrator
//!
//! Every failure is mapped through [`CipherError::io`], so a missing file
//! always surfaces as `BadFile` and anything else as `Unknown`.

use crate::error::{CipherError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read a whole file into memory
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| CipherError::io(path, "read", e))
}

/// Read a whole file as UTF-8 text
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CipherError::io(path, "read", e))
}

/// Create `path` if missing, or truncate it to zero length if present
///
/// Called on every destination before the cipher primitive runs, so an
/// aborted run leaves an empty file behind rather than no file at all.
pub fn create_or_truncate(path: &Path) -> Result<()> {
    write_file_secure(path, &[])
}

/// Write file with secure permissions (0o600 on Unix)
pub fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| CipherError::io(path, "open", e))?;

        file.write_all(contents)
            .map_err(|e| CipherError::io(path, "write", e))?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::File::create(path)
            .and_then(|mut file| file.write_all(contents))
            .map_err(|e| CipherError::io(path, "write", e))?;
        Ok(())
    }
}
