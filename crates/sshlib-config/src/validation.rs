// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints that serde attributes cannot express. The
//! configured encryption key is deliberately not decoded here; the key
//! provider owns that check and treats a bad key as fatal.

use crate::diagnostic::ConfigError;
use crate::model::SshlibConfig;

/// Accepted values for `app.log_level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Largest accepted Argon2id memory cost in KiB (1 GiB).
pub const MAX_KDF_MEMORY_COST: u32 = 1024 * 1024;

/// Largest accepted Argon2id iteration count.
pub const MAX_KDF_ITERATIONS: u32 = 16;

/// Largest accepted Argon2id lane count.
pub const MAX_KDF_PARALLELISM: u32 = 16;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &SshlibConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.app.log_level
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.vault.key_file.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.key_file must not be empty".to_string(),
        });
    }

    if !(32768..=MAX_KDF_MEMORY_COST).contains(&config.vault.kdf_memory_cost) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_memory_cost must be between 32768 (32 MiB) and {MAX_KDF_MEMORY_COST} (1 GiB), got {}",
                config.vault.kdf_memory_cost
            ),
        });
    }

    if !(2..=MAX_KDF_ITERATIONS).contains(&config.vault.kdf_iterations) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be between 2 and {MAX_KDF_ITERATIONS}, got {}",
                config.vault.kdf_iterations
            ),
        });
    }

    if !(1..=MAX_KDF_PARALLELISM).contains(&config.vault.kdf_parallelism) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_parallelism must be between 1 and {MAX_KDF_PARALLELISM}, got {}",
                config.vault.kdf_parallelism
            ),
        });
    }

    if config.ssh.relay_target.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "ssh.relay_target must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
