//! Batch encrypt/decrypt of every protected file
//!
//! A run moves through these phases:
//!
//! 1. the password is resolved before a [`Batch`] can be built
//! 2. encrypt discovers candidates from the ignore file; decrypt loads the
//!    manifest
//! 3. files are encoded or decoded one at a time through the single
//!    scratch file
//! 4. encrypt writes the manifest; both remove the scratch file
//!
//! The first cipher error aborts the whole run. Nothing is written to the
//! manifest for a failed encrypt, and later files are left untouched.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::BatchConfig;
use crate::discovery;
use crate::error::{CipherError, Result};
use crate::file_ops;
use crate::manifest::{self, Manifest};
use crate::options::{self, CipherOptions};
use crate::scratch::ScratchFile;
use crate::secretcrypt::Cipher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl Operation {
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Encrypt => "encrypted",
            Self::Decrypt => "decrypted",
        }
    }
}

/// Per-run state: the running success count and the scratch file that
/// every file is staged through.
#[derive(Debug)]
pub struct BatchContext {
    processed: usize,
    scratch: ScratchFile,
}

impl BatchContext {
    pub fn new(scratch: ScratchFile) -> Self {
        Self {
            processed: 0,
            scratch,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn scratch(&self) -> &ScratchFile {
        &self.scratch
    }

    fn record(&mut self) {
        self.processed += 1;
    }

    /// Releases the scratch file and returns the final count.
    pub fn finish(self) -> usize {
        self.processed
    }
}

pub struct Batch<'a, C: ?Sized, W> {
    cipher: &'a C,
    options: Map<String, Value>,
    password: Zeroizing<String>,
    config: &'a BatchConfig,
    progress: W,
}

impl<'a, C: Cipher + ?Sized, W: Write> Batch<'a, C, W> {
    /// `raw_options` may hold anything; only recognized cipher options are
    /// kept. Per-file progress lines are written to `progress`.
    pub fn new(
        cipher: &'a C,
        raw_options: &Map<String, Value>,
        password: Zeroizing<String>,
        config: &'a BatchConfig,
        progress: W,
    ) -> Self {
        Self {
            cipher,
            options: options::normalize(raw_options, options::RECOGNIZED_OPTIONS),
            password,
            config,
            progress,
        }
    }

    pub fn run(&mut self, operation: Operation) -> Result<usize> {
        match operation {
            Operation::Encrypt => self.encrypt(),
            Operation::Decrypt => self.decrypt(),
        }
    }

    /// Encrypts every existing candidate from the ignore file into the
    /// manifest and returns how many files were encrypted.
    pub fn encrypt(&mut self) -> Result<usize> {
        let ignore_file = self.config.ignore_file_path();
        let text = file_ops::read_to_string(&ignore_file)?;
        let candidates = discovery::discover(&text);
        debug!(
            ignore_file = %ignore_file.display(),
            candidates = candidates.len(),
            "discovered candidate files"
        );

        let mut ctx = BatchContext::new(ScratchFile::new(self.config.scratch_path()));
        let mut manifest = Manifest::new();
        for candidate in candidates {
            let source = self.config.resolve(&candidate);
            if !source.exists() {
                self.progress(format_args!("File not found: {}", candidate))?;
                continue;
            }

            self.progress(format_args!("Encrypting {}...", candidate))?;
            let ciphertext = self.encode_one(&ctx, &source)?;
            manifest.insert_ciphertext(candidate, &ciphertext);
            ctx.record();
        }

        let manifest_path = self.config.manifest_path();
        manifest.save(&manifest_path)?;
        debug!(manifest = %manifest_path.display(), entries = manifest.len(), "saved manifest");

        let processed = ctx.finish();
        info!(processed, "encrypt finished");
        Ok(processed)
    }

    /// Restores every manifest entry to its original path and returns how
    /// many files were decrypted.
    pub fn decrypt(&mut self) -> Result<usize> {
        let manifest_path = self.config.manifest_path();
        let entries = Manifest::load(&manifest_path)?;
        debug!(manifest = %manifest_path.display(), entries = entries.len(), "loaded manifest");

        let mut ctx = BatchContext::new(ScratchFile::new(self.config.scratch_path()));
        for (path, encoded) in entries.iter() {
            self.progress(format_args!("Decrypting {}...", path))?;
            let ciphertext = manifest::decode_ciphertext(encoded)
                .map_err(|e| e.with_context(format!("manifest entry for {} is corrupt", path)))?;
            self.decode_one(&ctx, &ciphertext, &self.config.resolve(path))?;
            ctx.record();
        }

        let processed = ctx.finish();
        info!(processed, "decrypt finished");
        Ok(processed)
    }

    fn encode_one(&self, ctx: &BatchContext, source: &Path) -> Result<Vec<u8>> {
        let scratch = ctx.scratch();
        scratch.reset()?;
        let options = self.cipher_options(source, scratch.path())?;
        self.cipher.encode(&options)?;
        scratch.read()
    }

    fn decode_one(&self, ctx: &BatchContext, ciphertext: &[u8], target: &Path) -> Result<()> {
        let scratch = ctx.scratch();
        scratch.stage(ciphertext)?;
        file_ops::create_or_truncate(target)?;
        let options = self.cipher_options(scratch.path(), target)?;
        self.cipher.decode(&options)
    }

    fn cipher_options(&self, input: &Path, output: &Path) -> Result<CipherOptions> {
        CipherOptions::resolve(&self.options, &self.password, input, output)
    }

    fn progress(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.progress, "{}", line)
            .map_err(|e| CipherError::unknown_with_source("failed to write progress", e))
    }
}
