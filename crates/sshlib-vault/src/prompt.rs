// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or the `SSHLIB_PASSPHRASE` environment variable.

use secrecy::SecretString;
use sshlib_core::SshlibError;

/// The environment variable name for providing an export/import passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "SSHLIB_PASSPHRASE";

fn from_env() -> Option<SecretString> {
    std::env::var(PASSPHRASE_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn read_tty(label: &str) -> Result<String, SshlibError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map_err(|e| SshlibError::Validation(format!("failed to read {label}: {e}")))
}

fn no_passphrase() -> SshlibError {
    SshlibError::Validation(format!(
        "No passphrase provided. Set {PASSPHRASE_ENV_VAR} or run interactively."
    ))
}

/// Get a passphrase from the environment or an interactive prompt.
///
/// Priority:
/// 1. `SSHLIB_PASSPHRASE` (for scripts and cron jobs)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase(label: &str) -> Result<SecretString, SshlibError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let passphrase = read_tty(label)?;
        if passphrase.is_empty() {
            return Err(SshlibError::Validation("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(no_passphrase())
}

/// Like [`get_passphrase`], but an interactive prompt asks twice.
pub fn get_passphrase_with_confirm(label: &str) -> Result<SecretString, SshlibError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = read_tty(label)?;
        let second = read_tty(&format!("Confirm {}", label.to_lowercase()))?;
        if first != second {
            return Err(SshlibError::Validation("passphrases do not match".to_string()));
        }
        if first.is_empty() {
            return Err(SshlibError::Validation("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(first));
    }

    Err(no_passphrase())
}

/// Prompt for a connection password. Empty input is allowed.
pub fn prompt_password(label: &str) -> Result<String, SshlibError> {
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(SshlibError::Validation(
            "password prompt requires an interactive terminal".to_string(),
        ));
    }
    read_tty(label)
}
