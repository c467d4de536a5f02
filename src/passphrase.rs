//! Password acquisition

use crate::error::{CipherError, Result};
use std::io::{self, BufRead, IsTerminal};
use tracing::debug;
use zeroize::Zeroizing;

/// Trait for one attempt at reading a password from some source
pub trait PasswordPrompt {
    /// Read one candidate password. An empty result is a valid answer;
    /// rejecting it is up to [`acquire_password`].
    fn prompt(&mut self) -> Result<Zeroizing<String>>;
}

/// Prompts on the terminal with no echo
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(CipherError::unknown(
                "cannot prompt for a password - stdin is not a terminal",
            ));
        }

        let password = rpassword::prompt_password("Enter the password: ")
            .map_err(|e| CipherError::unknown_with_source("failure reading password", e))?;

        Ok(Zeroizing::new(password))
    }
}

/// Reads one password per line from any buffered reader
pub struct ReaderPrompt<R> {
    reader: R,
}

impl<R: BufRead> ReaderPrompt<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> PasswordPrompt for ReaderPrompt<R> {
    fn prompt(&mut self) -> Result<Zeroizing<String>> {
        let mut line = Zeroizing::new(String::new());
        let read = self.reader.read_line(&mut line).map_err(|e| {
            CipherError::unknown_with_source("error reading password", e)
        })?;
        if read == 0 {
            return Err(CipherError::unknown(
                "end of input reached while waiting for a password",
            ));
        }

        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(line)
    }
}

/// Returns `supplied` when present, otherwise prompts until a non-empty
/// password is entered.
///
/// No file work may start before this returns.
pub fn acquire_password(
    supplied: Option<String>,
    prompt: &mut dyn PasswordPrompt,
) -> Result<Zeroizing<String>> {
    if let Some(password) = supplied {
        return Ok(Zeroizing::new(password));
    }

    loop {
        let password = prompt.prompt()?;
        if !password.is_empty() {
            debug!("password provided");
            return Ok(password);
        }
        debug!("empty password rejected, prompting again");
    }
}
