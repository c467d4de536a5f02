//! Cipher parameters and the normalizer that filters loose option sets
//! down to them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::error::{CipherError, Result};

/// Keys accepted by the cipher primitive. Anything else in a raw option
/// set is dropped by [`normalize`].
pub const RECOGNIZED_OPTIONS: &[&str] = &[
    "algorithm",
    "password",
    "salt",
    "iterations",
    "keylen",
    "digest",
];

pub const DEFAULT_ALGORITHM: &str = "aes-256-cbc";
pub const DEFAULT_SALT: &str = "nodecipher";
pub const DEFAULT_ITERATIONS: u32 = 1000;
pub const DEFAULT_KEYLEN: usize = 512;
pub const DEFAULT_DIGEST: &str = "sha256";

/// Copies every key of `recognized` that is present in `raw` and not
/// `null`. Values are not validated here.
pub fn normalize(raw: &Map<String, Value>, recognized: &[&str]) -> Map<String, Value> {
    recognized
        .iter()
        .filter_map(|&key| match raw.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some((key.to_owned(), value.clone())),
        })
        .collect()
}

/// Full parameter set for one call into the cipher primitive.
///
/// Built per file and never modified afterwards. The password is never
/// read from an option map; it is attached by [`CipherOptions::resolve`]
/// and wiped from memory on drop.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CipherOptions {
    pub algorithm: String,
    #[serde(skip, default = "empty_password")]
    pub password: Zeroizing<String>,
    pub salt: String,
    pub iterations: u32,
    pub keylen: usize,
    pub digest: String,
    #[serde(skip)]
    pub input: PathBuf,
    #[serde(skip)]
    pub output: PathBuf,
}

impl CipherOptions {
    /// Overlays a normalized option map onto the defaults and attaches the
    /// password and file paths.
    ///
    /// A `password` key carried in `partial` is ignored in favor of the
    /// explicit argument.
    pub fn resolve(
        partial: &Map<String, Value>,
        password: &str,
        input: &Path,
        output: &Path,
    ) -> Result<Self> {
        let mut options: CipherOptions = serde_json::from_value(Value::Object(partial.clone()))
            .map_err(|e| CipherError::unknown_with_source("invalid cipher option", e))?;
        options.password = Zeroizing::new(password.to_owned());
        options.input = input.to_path_buf();
        options.output = output.to_path_buf();
        Ok(options)
    }
}

impl Default for CipherOptions {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_owned(),
            password: empty_password(),
            salt: DEFAULT_SALT.to_owned(),
            iterations: DEFAULT_ITERATIONS,
            keylen: DEFAULT_KEYLEN,
            digest: DEFAULT_DIGEST.to_owned(),
            input: PathBuf::new(),
            output: PathBuf::new(),
        }
    }
}

fn empty_password() -> Zeroizing<String> {
    Zeroizing::new(String::new())
}

impl fmt::Debug for CipherOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherOptions")
            .field("algorithm", &self.algorithm)
            .field("password", &"<redacted>")
            .field("salt", &self.salt)
            .field("iterations", &self.iterations)
            .field("keylen", &self.keylen)
            .field("digest", &self.digest)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}
