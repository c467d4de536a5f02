//! multicrypt CLI - batch encryption of the secret files listed in .gitignore
//!
//! `encrypt` reads the files named after the `# secret` marker in the
//! ignore file and writes their ciphertext to `encrypted.json`; `decrypt`
//! restores them from it.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use multicrypt::batch::{Batch, Operation};
use multicrypt::config::{BatchConfig, DEFAULT_IGNORE_FILE, DEFAULT_MANIFEST, DEFAULT_SCRATCH};
use multicrypt::passphrase::{self, PasswordPrompt, ReaderPrompt, TerminalPrompt};
use multicrypt::report;
use multicrypt::secretcrypt::{ALGORITHMS, DIGESTS, Pbkdf2Cipher};
use multicrypt::{CipherError, Result};

#[derive(Parser)]
#[command(name = "multicrypt")]
#[command(version)]
#[command(about = "Encrypt the secret files listed in .gitignore into a single manifest.", long_about = None)]
struct Cli {
    /// Password to derive the key from (prompted for when absent)
    #[arg(short, long, global = true, env = "MULTICRYPT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Read the password from stdin instead of from the terminal
    #[arg(long, global = true)]
    password_stdin: bool,

    #[command(flatten)]
    cipher: CipherArgs,

    /// Directory the ignore file, manifest and secret paths are relative to
    #[arg(short = 'C', long, global = true, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Ignore file listing the secret files after a `# secret` line
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_IGNORE_FILE)]
    ignore_file: PathBuf,

    /// Manifest holding the encrypted files
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Scratch file used while processing each file
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_SCRATCH)]
    scratch: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// List the supported cipher algorithms
    #[arg(long, conflicts_with = "hashes")]
    algorithms: bool,

    /// List the supported digest hashes
    #[arg(long)]
    hashes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Cipher parameters; unset ones fall back to the library defaults
#[derive(Args, Serialize)]
struct CipherArgs {
    /// Cipher algorithm
    #[arg(short, long, global = true)]
    algorithm: Option<String>,

    /// Salt for key derivation
    #[arg(short, long, global = true)]
    salt: Option<String>,

    /// PBKDF2 iteration count
    #[arg(short, long, global = true)]
    iterations: Option<u32>,

    /// Number of bytes of key material to derive
    #[arg(short, long, global = true)]
    keylen: Option<usize>,

    /// HMAC digest for key derivation
    #[arg(short, long, global = true)]
    digest: Option<String>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Encrypt every secret file into the manifest
    #[command(alias = "e")]
    Encrypt,

    /// Restore every file in the manifest
    #[command(alias = "d")]
    Decrypt,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.algorithms || cli.hashes {
        let names = if cli.algorithms { ALGORITHMS } else { DIGESTS };
        for name in names {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let Some(command) = cli.command else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingSubcommand,
                "a subcommand is required",
            )
            .exit();
    };
    let operation = match command {
        Commands::Encrypt => Operation::Encrypt,
        Commands::Decrypt => Operation::Decrypt,
    };

    let config = BatchConfig {
        root: cli.directory.clone(),
        ignore_file: cli.ignore_file.clone(),
        manifest: cli.manifest.clone(),
        scratch: cli.scratch.clone(),
    };

    match run(&cli, operation, &config) {
        Ok(files) => {
            println!("{}", report::render_success(files, operation, &config.manifest));
            report::handle(None)
        }
        Err(e) => report::handle(Some(&e)),
    }
}

fn run(cli: &Cli, operation: Operation, config: &BatchConfig) -> Result<usize> {
    let supplied = if cli.password_stdin {
        None
    } else {
        cli.password.clone()
    };
    let mut prompt = get_password_prompt(cli.password_stdin);
    let password = passphrase::acquire_password(supplied, &mut *prompt)?;

    let raw_options = cipher_options(&cli.cipher)?;
    let cipher = Pbkdf2Cipher;
    let stdout = io::stdout();
    let mut batch = Batch::new(&cipher, &raw_options, password, config, stdout.lock());
    batch.run(operation)
}

/// Unset flags serialize as `null` and are dropped by the normalizer.
fn cipher_options(args: &CipherArgs) -> Result<Map<String, Value>> {
    match serde_json::to_value(args) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CipherError::unknown("cipher options did not serialize to an object")),
        Err(e) => Err(CipherError::unknown_with_source("failed to collect cipher options", e)),
    }
}

fn get_password_prompt(use_stdin: bool) -> Box<dyn PasswordPrompt> {
    if use_stdin {
        Box::new(ReaderPrompt::new(io::stdin().lock()))
    } else {
        Box::new(TerminalPrompt::new())
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
