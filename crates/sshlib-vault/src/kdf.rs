// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a passphrase.
//!
//! Used only for export blobs: the derived key exists for the duration of one
//! export or import and is independent of the process-wide field key.

use serde::{Deserialize, Serialize};
use sshlib_config::model::VaultConfig;
use sshlib_config::validation::{MAX_KDF_ITERATIONS, MAX_KDF_MEMORY_COST, MAX_KDF_PARALLELISM};
use sshlib_core::SshlibError;
use zeroize::Zeroizing;

use crate::crypto;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;


/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    pub fn from_config(config: &VaultConfig) -> Self {
        Self {
            memory_cost: config.kdf_memory_cost,
            iterations: config.kdf_iterations,
            parallelism: config.kdf_parallelism,
        }
    }

    /// Reject parameters that would make derivation unreasonably expensive.
    ///
    /// Uses the same upper limits as configuration validation.
    pub fn check_bounds(&self) -> Result<(), SshlibError> {
        if self.memory_cost > MAX_KDF_MEMORY_COST
            || self.iterations == 0
            || self.iterations > MAX_KDF_ITERATIONS
            || self.parallelism == 0
            || self.parallelism > MAX_KDF_PARALLELISM
        {
            return Err(SshlibError::Validation(format!(
                "unsupported key derivation parameters: {self:?}"
            )));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from a passphrase using Argon2id v0x13.
///
/// The returned key is zeroed on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, SshlibError> {
    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| SshlibError::Validation(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 =
        argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, argon_params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| SshlibError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], SshlibError> {
    crypto::random_bytes::<SALT_LEN>()
}
