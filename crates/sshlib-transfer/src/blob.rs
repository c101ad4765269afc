// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The portable export blob and its binary field encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sshlib_core::SshlibError;
use sshlib_vault::crypto::{NONCE_LEN, Sealed, TAG_LEN};
use sshlib_vault::kdf::SALT_LEN;
use sshlib_vault::KdfParams;

/// The only blob format version this build reads and writes.
pub const BLOB_VERSION: u32 = 1;

/// A dataset sealed under a passphrase-derived key.
///
/// Binary fields are standard base64. `kdf` records the Argon2id parameters
/// used; blobs without it were written with the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBlob {
    pub version: u32,
    pub salt: String,
    pub iv: String,
    pub tag: String,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

/// Binary fields of a blob after decoding and size checks.
pub(crate) struct DecodedBlob {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub data: Vec<u8>,
    pub kdf: KdfParams,
}

impl std::fmt::Debug for DecodedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedBlob")
            .field("data_len", &self.data.len())
            .field("kdf", &self.kdf)
            .finish_non_exhaustive()
    }
}

impl ExportBlob {
    pub(crate) fn seal(salt: &[u8; SALT_LEN], sealed: &Sealed, kdf: KdfParams) -> Self {
        Self {
            version: BLOB_VERSION,
            salt: BASE64.encode(salt),
            iv: BASE64.encode(sealed.nonce),
            tag: BASE64.encode(sealed.tag),
            data: BASE64.encode(&sealed.ciphertext),
            kdf: Some(kdf),
        }
    }

    /// Parse a blob from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SshlibError> {
        serde_json::from_str(text)
            .map_err(|e| SshlibError::Validation(format!("export blob is not valid JSON: {e}")))
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, SshlibError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SshlibError::Internal(format!("failed to serialize export blob: {e}")))
    }

    pub(crate) fn decode(&self) -> Result<DecodedBlob, SshlibError> {
        if self.version != BLOB_VERSION {
            return Err(SshlibError::Validation(format!(
                "unsupported export blob version {}",
                self.version
            )));
        }
        let kdf = self.kdf.unwrap_or_default();
        kdf.check_bounds()?;

        Ok(DecodedBlob {
            salt: decode_fixed("salt", &self.salt)?,
            iv: decode_fixed("iv", &self.iv)?,
            tag: decode_fixed("tag", &self.tag)?,
            data: decode_field("data", &self.data)?,
            kdf,
        })
    }
}

fn decode_field(field: &str, value: &str) -> Result<Vec<u8>, SshlibError> {
    BASE64
        .decode(value.trim())
        .map_err(|_| SshlibError::Validation(format!("export blob field `{field}` is not valid base64")))
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<[u8; N], SshlibError> {
    let bytes = decode_field(field, value)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        SshlibError::Validation(format!(
            "export blob field `{field}` must be {N} bytes, got {}",
            bytes.len()
        ))
    })
}
