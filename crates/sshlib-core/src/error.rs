// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the SSH connection library.

use thiserror::Error;

/// The error type shared by every crate in the workspace.
///
/// Configuration failures are fatal at startup. Validation, authentication
/// and invalid-operation failures go back to the caller with a short reason.
/// Storage failures roll back the surrounding transaction.
#[derive(Debug, Error)]
pub enum SshlibError {
    /// Missing or malformed configuration or key material.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An authentication tag did not verify (tampered data, wrong key, wrong passphrase).
    #[error("authentication error: {0}")]
    Authentication(String),

    /// A structural rule was violated, e.g. deleting the default folder.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SshlibError {
    /// Stable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SshlibError::Config(_) => "configuration",
            SshlibError::Validation(_) => "validation",
            SshlibError::Authentication(_) => "authentication",
            SshlibError::InvalidOperation(_) => "invalid_operation",
            SshlibError::Storage { .. } => "storage",
            SshlibError::Internal(_) => "internal",
        }
    }

    /// Whether the message may be shown to the caller verbatim.
    pub fn is_caller_facing(&self) -> bool {
        matches!(
            self,
            SshlibError::Validation(_)
                | SshlibError::Authentication(_)
                | SshlibError::InvalidOperation(_)
        )
    }
}
