// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of the process-wide field encryption key.
//!
//! Resolution order:
//! 1. An explicitly configured base64 key (`vault.encryption_key`).
//! 2. A key previously persisted at `vault.key_file`.
//! 3. A freshly generated key, persisted to `vault.key_file` before it is
//!    handed out. If another process publishes a key first, that key is used.
//!
//! Any malformed key is a fatal configuration error; nothing is retried and an
//! existing key file is never overwritten.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use sshlib_config::model::VaultConfig;
use sshlib_core::SshlibError;
use strum::Display;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, FieldCipher};

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum KeySource {
    Configured,
    File,
    Generated,
}

/// A resolved key together with its origin.
pub struct ProvisionedKey {
    key: Zeroizing<[u8; KEY_LEN]>,
    source: KeySource,
}

impl std::fmt::Debug for ProvisionedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionedKey")
            .field("key", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

impl ProvisionedKey {
    pub fn source(&self) -> KeySource {
        self.source
    }

    /// Hand the key to a [`FieldCipher`]; the cipher is the only holder afterwards.
    pub fn into_cipher(self) -> FieldCipher {
        FieldCipher::new(self.key)
    }
}

/// Resolves the field encryption key from configuration or local storage.
pub struct KeyProvider {
    configured: Option<SecretString>,
    key_path: PathBuf,
}

impl std::fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyProvider")
            .field("configured", &self.configured.as_ref().map(|_| "[REDACTED]"))
            .field("key_path", &self.key_path)
            .finish()
    }
}

impl KeyProvider {
    /// An empty or whitespace-only `configured` value counts as absent.
    pub fn new(configured: Option<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            configured: configured
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            key_path: key_path.into(),
        }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(config.encryption_key.clone(), &config.key_file)
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Resolve the key, generating and persisting one on first run.
    pub fn resolve(&self) -> Result<ProvisionedKey, SshlibError> {
        if let Some(configured) = &self.configured {
            let key = decode_key(configured.expose_secret())
                .map_err(|e| SshlibError::Config(format!("vault.encryption_key: {e}")))?;
            info!(source = %KeySource::Configured, "field encryption key resolved");
            return Ok(ProvisionedKey {
                key,
                source: KeySource::Configured,
            });
        }

        match fs::read_to_string(&self.key_path) {
            Ok(content) => self.decode_file_content(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let key = crypto::generate_random_key()?;
                if !persist_key(&self.key_path, &key)? {
                    // Another process published its key first; use that one.
                    return self.read_key_file();
                }
                warn!(
                    path = %self.key_path.display(),
                    "no encryption key found -- generated and persisted a new one"
                );
                Ok(ProvisionedKey {
                    key,
                    source: KeySource::Generated,
                })
            }
            Err(e) => Err(self.unreadable(e)),
        }
    }

    fn read_key_file(&self) -> Result<ProvisionedKey, SshlibError> {
        let content = fs::read_to_string(&self.key_path).map_err(|e| self.unreadable(e))?;
        self.decode_file_content(content)
    }

    fn decode_file_content(&self, content: String) -> Result<ProvisionedKey, SshlibError> {
        let content = Zeroizing::new(content);
        let key = decode_key(&content).map_err(|e| {
            SshlibError::Config(format!("key file {}: {e}", self.key_path.display()))
        })?;
        info!(
            source = %KeySource::File,
            path = %self.key_path.display(),
            "field encryption key resolved"
        );
        Ok(ProvisionedKey {
            key,
            source: KeySource::File,
        })
    }

    fn unreadable(&self, e: std::io::Error) -> SshlibError {
        SshlibError::Config(format!(
            "cannot read key file {}: {e}",
            self.key_path.display()
        ))
    }
}

/// Decode base64 key material, requiring exactly [`KEY_LEN`] bytes.
pub fn decode_key(encoded: &str) -> Result<Zeroizing<[u8; KEY_LEN]>, SshlibError> {
    let decoded = Zeroizing::new(
        BASE64
            .decode(encoded.trim())
            .map_err(|_| SshlibError::Config("key is not valid base64".to_string()))?,
    );
    if decoded.len() != KEY_LEN {
        return Err(SshlibError::Config(format!(
            "key must be {KEY_LEN} bytes in base64 encoding, got {} bytes",
            decoded.len()
        )));
    }
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&decoded);
    Ok(key)
}

/// Write the key as base64 to a private temp file, mode 0600 on unix, then
/// hard-link it into place.
///
/// Returns `false` without touching `path` when a key file already exists
/// there.
fn persist_key(path: &Path, key: &[u8; KEY_LEN]) -> Result<bool, SshlibError> {
    let io_err = |e: std::io::Error| {
        SshlibError::Config(format!("cannot persist key file {}: {e}", path.display()))
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let suffix = u32::from_le_bytes(crypto::random_bytes::<4>()?);
    let tmp = path.with_extension(format!("tmp.{}.{suffix:08x}", std::process::id()));
    let encoded = Zeroizing::new(BASE64.encode(key));
    let written = (|| -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(encoded.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()
    })();

    let linked = written.and_then(|()| fs::hard_link(&tmp, path));
    let _ = fs::remove_file(&tmp);
    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(io_err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn encoded(byte: u8, len: usize) -> String {
        BASE64.encode(vec![byte; len])
    }

    #[test]
    fn configured_key_wins_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, encoded(1, 32)).unwrap();

        let provider = KeyProvider::new(Some(encoded(9, 32)), &path);
        let key = provider.resolve().unwrap();
        assert_eq!(key.source(), KeySource::Configured);
        assert_eq!(*key.key, [9u8; 32]);
    }

    #[test]
    fn blank_configured_key_falls_through_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, format!("{}\n", encoded(3, 32))).unwrap();

        let key = KeyProvider::new(Some("   ".into()), &path).resolve().unwrap();
        assert_eq!(key.source(), KeySource::File);
        assert_eq!(*key.key, [3u8; 32]);
    }

    #[test]
    fn wrong_size_configured_key_is_fatal() {
        let dir = tempdir().unwrap();
        let provider = KeyProvider::new(Some(encoded(1, 16)), dir.path().join("key"));
        let err = provider.resolve().unwrap_err();
        assert!(matches!(err, SshlibError::Config(_)));
        assert!(!dir.path().join("key").exists(), "no fallback to generation");
    }

    #[test]
    fn malformed_key_file_is_fatal_and_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, "!!not base64!!").unwrap();

        let err = KeyProvider::new(None, &path).resolve().unwrap_err();
        assert!(matches!(err, SshlibError::Config(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "!!not base64!!");
    }

    #[test]
    fn empty_key_file_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            KeyProvider::new(None, &path).resolve(),
            Err(SshlibError::Config(_))
        ));
    }

    #[test]
    fn missing_key_is_generated_and_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("key");
        let provider = KeyProvider::new(None, &path);

        let first = provider.resolve().unwrap();
        assert_eq!(first.source(), KeySource::Generated);
        assert!(path.exists());

        let second = provider.resolve().unwrap();
        assert_eq!(second.source(), KeySource::File);
        assert_eq!(*first.key, *second.key);
    }

    #[test]
    fn generation_never_replaces_a_published_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");

        let ours = crypto::generate_random_key().unwrap();
        assert!(persist_key(&path, &ours).unwrap());
        let theirs = crypto::generate_random_key().unwrap();
        assert!(!persist_key(&path, &theirs).unwrap());

        let resolved = KeyProvider::new(None, &path).resolve().unwrap();
        assert_eq!(*resolved.key, *ours);
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temp files are cleaned up");
    }

    #[test]
    fn concurrent_first_runs_agree_on_one_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || *KeyProvider::new(None, path).resolve().unwrap().key)
            })
            .collect();
        let keys: Vec<[u8; KEY_LEN]> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let on_disk = KeyProvider::new(None, &path).resolve().unwrap();
        assert!(keys.iter().all(|k| *k == *on_disk.key));
    }

    #[cfg(unix)]
    #[test]
    fn generated_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        KeyProvider::new(None, &path).resolve().unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn generated_key_encrypts_for_later_process() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");

        let token = KeyProvider::new(None, &path)
            .resolve()
            .unwrap()
            .into_cipher()
            .encrypt("s3cret")
            .unwrap();

        // A second "process" reads the persisted key.
        let cipher = KeyProvider::new(None, &path).resolve().unwrap().into_cipher();
        assert_eq!(cipher.decrypt(&token).unwrap(), "s3cret");
    }

    #[test]
    fn debug_output_hides_material() {
        let provider = KeyProvider::new(Some(encoded(5, 32)), "data/key");
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains(&encoded(5, 32)));
        let key = provider.resolve().unwrap();
        assert!(format!("{key:?}").contains("[REDACTED]"));
    }

    #[test]
    fn key_source_display_is_snake_case() {
        assert_eq!(KeySource::Generated.to_string(), "generated");
    }
}
