//! multicrypt - batch encryption of the secret files listed in `.gitignore`
//!
//! Files named after a `# secret` marker line in an ignore file are encrypted
//! one at a time with a password-derived key and collected, base64-encoded,
//! into a single JSON manifest that can be committed in their place.

#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod discovery;
pub mod error;
pub mod file_ops;
pub mod manifest;
pub mod options;
pub mod passphrase;
pub mod report;
pub mod scratch;
pub mod secretcrypt;

pub use error::{CipherError, ErrorKind, Result};
