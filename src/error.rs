use std::error::Error as StdError;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Plain tag for the variants of [`CipherError`], for consumers that only
/// need to branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested cipher algorithm is not supported.
    BadAlgorithm,
    /// The requested HMAC digest for key derivation is not supported.
    BadDigest,
    /// A referenced file does not exist.
    BadFile,
    /// Ciphertext did not authenticate or unpad under the derived key.
    BadDecrypt,
    /// Any failure that cannot be confidently attributed to another kind.
    ///
    /// Manifest read and parse failures land here as well.
    Unknown,
}

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("unsupported cipher algorithm \"{algorithm}\"")]
    BadAlgorithm { algorithm: String },

    #[error("unsupported digest \"{digest}\"")]
    BadDigest { digest: String },

    #[error("\"{}\" does not exist", path.display())]
    BadFile { path: PathBuf },

    #[error("bad decrypt")]
    BadDecrypt,

    #[error("{msg}")]
    Unknown {
        msg: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },
}

impl CipherError {
    /// Creates an unclassified error carrying only a message.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown {
            msg: msg.into(),
            source: None,
        }
    }

    /// Creates an unclassified error that retains the originating source error.
    pub fn unknown_with_source(
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Unknown {
            msg: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Classifies a filesystem failure on `path`. A missing file is a
    /// `BadFile`; everything else is unclassified.
    pub fn io(path: &Path, action: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::BadFile {
                path: path.to_path_buf(),
            }
        } else {
            Self::unknown_with_source(format!("failed to {} {}", action, path.display()), err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadAlgorithm { .. } => ErrorKind::BadAlgorithm,
            Self::BadDigest { .. } => ErrorKind::BadDigest,
            Self::BadFile { .. } => ErrorKind::BadFile,
            Self::BadDecrypt => ErrorKind::BadDecrypt,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Wraps an unclassified error with a higher-level message while
    /// preserving the original as source. Classified errors pass through
    /// untouched so their kind survives.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        match self {
            Self::Unknown { .. } => Self::Unknown {
                msg: msg.into(),
                source: Some(Box::new(self)),
            },
            classified => classified,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CipherError>;
