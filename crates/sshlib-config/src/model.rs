// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SshlibConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// SQLite database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key material and export key-derivation settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// SSH command construction settings.
    #[serde(default)]
    pub ssh: SshConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "data/ssh_library.sqlite".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Key material and export key-derivation configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Base64-encoded 32-byte field encryption key. Takes precedence over `key_file`.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// Where the field encryption key is read from, or generated into when absent.
    #[serde(default = "default_key_file")]
    pub key_file: String,

    /// Argon2id memory cost in KiB for export blobs (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count for export blobs (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes for export blobs (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("key_file", &self.key_file)
            .field("kdf_memory_cost", &self.kdf_memory_cost)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("kdf_parallelism", &self.kdf_parallelism)
            .finish()
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            encryption_key: None,
            key_file: default_key_file(),
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_key_file() -> String {
    "data/key".to_string()
}

fn default_kdf_memory_cost() -> u32 {
    65536
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// SSH command construction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SshConfig {
    /// `user@host` that dynamic-port connections are reached through.
    #[serde(default = "default_relay_target")]
    pub relay_target: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            relay_target: default_relay_target(),
        }
    }
}

fn default_relay_target() -> String {
    "root@reverse-ssh-production".to_string()
}
