//! User-facing diagnostics
//!
//! Every [`CipherError`] variant has its own renderer. Rendering an error
//! is always followed by exit status 1; success is reported separately with
//! the final file count.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;

use crate::batch::Operation;
use crate::error::CipherError;

/// Knobs that feed key derivation; any of them being wrong looks the same
/// at decrypt time.
const DERIVATION_INPUTS: &[&str] = &[
    "password",
    "salt",
    "algorithm",
    "iterations",
    "keylen",
    "digest",
];

pub fn render_error(err: &CipherError) -> String {
    match err {
        CipherError::BadAlgorithm { algorithm } => render_bad_algorithm(algorithm),
        CipherError::BadDigest { digest } => render_bad_digest(digest),
        CipherError::BadFile { path } => render_bad_file(path),
        CipherError::BadDecrypt => render_bad_decrypt(),
        CipherError::Unknown { .. } => render_unknown(err),
    }
}

fn render_bad_algorithm(algorithm: &str) -> String {
    format!(
        "Error: BadAlgorithm. \"{}\" is not supported. Use `multicrypt --algorithms` to see a \
         list of valid algorithms.",
        algorithm
    )
}

fn render_bad_digest(digest: &str) -> String {
    format!(
        "Error: BadDigest. \"{}\" is not supported. Use `multicrypt --hashes` to see a list of \
         valid digest hashes.",
        digest
    )
}

fn render_bad_file(path: &Path) -> String {
    format!("Error: BadFile. \"{}\" does not exist.", path.display())
}

fn render_bad_decrypt() -> String {
    let mut msg =
        String::from("Error: BadDecrypt. One or more of the following is likely incorrect:\n");
    for input in DERIVATION_INPUTS {
        let _ = write!(msg, "\n  - {}", input);
    }
    msg
}

fn render_unknown(err: &CipherError) -> String {
    let mut msg = format!("Error: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(msg, ": {}", cause);
        source = cause.source();
    }
    msg
}

/// Summary printed after a successful run
pub fn render_success(files: usize, operation: Operation, manifest: &Path) -> String {
    let mut msg = format!("\nSuccess!\n{} file(s) {}.", files, operation.past_tense());
    if operation == Operation::Encrypt {
        let _ = write!(
            msg,
            "\nEncrypted files are located in {}.",
            manifest.display()
        );
    }
    msg
}

/// Renders `err` to stderr, if any, and returns the matching exit status.
///
/// `None` is the success path and prints nothing.
pub fn handle(err: Option<&CipherError>) -> ExitCode {
    match err {
        Some(err) => {
            eprintln!("\n{}\n", render_error(err));
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
