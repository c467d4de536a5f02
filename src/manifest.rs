//! The JSON manifest mapping original file paths to their ciphertext
//!
//! The document is a single object, pretty-printed with 4-space indent:
//!
//! ```json
//! {
//!     ".env": "base64 ciphertext...",
//!     "config/keys.json": "base64 ciphertext..."
//! }
//! ```
//!
//! Values use standard, padded base64. Keys keep insertion order.

use std::fs;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{CipherError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: IndexMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `path` with an already-encoded value.
    pub fn insert(&mut self, path: impl Into<String>, encoded: impl Into<String>) {
        self.entries.insert(path.into(), encoded.into());
    }

    /// Base64-encodes `ciphertext` and stores it under `path`.
    pub fn insert_ciphertext(&mut self, path: impl Into<String>, ciphertext: &[u8]) {
        self.insert(path, encode_ciphertext(ciphertext));
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Writes the manifest to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)
            .map_err(|e| CipherError::unknown_with_source("failed to serialize manifest", e))?;
        fs::write(path, &buf).map_err(|e| CipherError::io(path, "write", e))
    }

    /// Reads a manifest from `path`.
    ///
    /// A missing or malformed file is an unclassified error.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| {
            CipherError::unknown_with_source(
                format!("failed to read manifest {}", path.display()),
                e,
            )
        })?;
        serde_json::from_slice(&data).map_err(|e| {
            CipherError::unknown_with_source(
                format!("failed to parse manifest {}", path.display()),
                e,
            )
        })
    }
}

pub fn encode_ciphertext(ciphertext: &[u8]) -> String {
    STANDARD.encode(ciphertext)
}

pub fn decode_ciphertext(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| CipherError::unknown_with_source("base64 decoding failed", e))
}
