// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sshlib.toml` > `~/.config/sshlib/sshlib.toml` > `/etc/sshlib/sshlib.toml`
//! with environment variable overrides via `SSHLIB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SshlibConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/sshlib/sshlib.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sshlib.toml";

/// Per-user config file under the XDG config directory, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sshlib").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sshlib/sshlib.toml`
/// 3. `~/.config/sshlib/sshlib.toml`
/// 4. `./sshlib.toml`
/// 5. `SSHLIB_*` environment variables
pub fn load_config() -> Result<SshlibConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SshlibConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SshlibConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SshlibConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SshlibConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the XDG lookup, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SshlibConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Config sections that environment variables may address.
const ENV_SECTIONS: [&str; 4] = ["app", "storage", "vault", "ssh"];

/// Environment provider mapping `SSHLIB_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SSHLIB_VAULT_KEY_FILE` must become `vault.key_file`.
/// Variables outside the known sections (such as `SSHLIB_PASSPHRASE`) are
/// ignored instead of tripping `deny_unknown_fields`.
fn env_provider() -> Env {
    Env::prefixed("SSHLIB_")
        .filter(|key| {
            let key = key.as_str().to_ascii_lowercase();
            ENV_SECTIONS
                .iter()
                .any(|section| key.starts_with(&format!("{section}_")))
        })
        .map(|key| {
            let key = key.as_str().to_ascii_lowercase();
            let mapped = ENV_SECTIONS
                .iter()
                .find_map(|section| {
                    key.strip_prefix(&format!("{section}_"))
                        .map(|rest| format!("{section}.{rest}"))
                })
                .unwrap_or(key);
            mapped.into()
        })
}
