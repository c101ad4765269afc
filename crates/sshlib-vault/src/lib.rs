// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key provisioning and field-level encryption.
//!
//! The [`KeyProvider`] resolves the process-wide 32-byte key (configured
//! value, persisted key file, or a freshly generated and persisted key). The
//! [`FieldCipher`] uses that key to seal individual secret strings with
//! AES-256-GCM. The [`kdf`] module derives the separate passphrase keys used
//! for portable export blobs.

pub mod crypto;
pub mod kdf;
pub mod key;
pub mod prompt;

pub use crypto::FieldCipher;
pub use kdf::KdfParams;
pub use key::{KeyProvider, KeySource, ProvisionedKey};
pub use prompt::{get_passphrase, get_passphrase_with_confirm, prompt_password, PASSPHRASE_ENV_VAR};
