// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export and import of the whole store under a passphrase.
//!
//! The passphrase key is derived with Argon2id and used only for the duration
//! of one call; it is independent of the process-wide field key, so a blob
//! can be imported on any instance.

use secrecy::{ExposeSecret, SecretString};
use sshlib_core::{ConnectionStore, Dataset, SshlibError};
use sshlib_vault::crypto;
use sshlib_vault::kdf::{self, SALT_LEN};
use sshlib_vault::KdfParams;
use tracing::info;
use zeroize::Zeroizing;

use crate::blob::ExportBlob;
use crate::normalize::{Payload, normalize};

/// Seals and restores full datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetCodec {
    params: KdfParams,
}

impl DatasetCodec {
    /// A codec that derives export keys with `params`.
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// Snapshot the store and seal it under `passphrase`.
    pub async fn export(
        &self,
        store: &dyn ConnectionStore,
        passphrase: &SecretString,
    ) -> Result<ExportBlob, SshlibError> {
        require_passphrase(passphrase)?;
        self.params.check_bounds()?;

        let dataset = store.snapshot().await?;
        let payload = Zeroizing::new(serde_json::to_vec(&dataset).map_err(|e| {
            SshlibError::Internal(format!("failed to serialize dataset: {e}"))
        })?);

        let salt = kdf::generate_salt()?;
        let key = derive_off_thread(passphrase, salt, self.params).await?;
        let sealed = crypto::seal(&key, &payload)?;

        info!(
            folders = dataset.folders.len(),
            connections = dataset.connections.len(),
            "dataset exported"
        );
        Ok(ExportBlob::seal(&salt, &sealed, self.params))
    }

    /// Open `blob` with `passphrase` and atomically replace the store with
    /// its normalized contents. Returns the dataset as committed.
    ///
    /// Nothing is written unless decryption, parsing and validation all succeed.
    pub async fn import(
        &self,
        store: &dyn ConnectionStore,
        passphrase: &SecretString,
        blob: &ExportBlob,
    ) -> Result<Dataset, SshlibError> {
        require_passphrase(passphrase)?;
        let decoded = blob.decode()?;

        let key = derive_off_thread(passphrase, decoded.salt, decoded.kdf).await?;
        let plaintext = Zeroizing::new(crypto::open(
            &key,
            &decoded.iv,
            &decoded.tag,
            &decoded.data,
        )?);

        let replacement = normalize(Payload::parse(&plaintext)?)?;
        store.replace_all(replacement).await?;

        let dataset = store.snapshot().await?;
        info!(
            folders = dataset.folders.len(),
            connections = dataset.connections.len(),
            "dataset imported"
        );
        Ok(dataset)
    }
}

fn require_passphrase(passphrase: &SecretString) -> Result<(), SshlibError> {
    if passphrase.expose_secret().is_empty() {
        return Err(SshlibError::Validation("passphrase is required".to_string()));
    }
    Ok(())
}

/// Run Argon2id on the blocking pool.
async fn derive_off_thread(
    passphrase: &SecretString,
    salt: [u8; SALT_LEN],
    params: KdfParams,
) -> Result<Zeroizing<[u8; 32]>, SshlibError> {
    let secret = Zeroizing::new(passphrase.expose_secret().as_bytes().to_vec());
    tokio::task::spawn_blocking(move || kdf::derive_key(&secret, &salt, &params))
        .await
        .map_err(|e| SshlibError::Internal(format!("key derivation task failed: {e}")))?
}
