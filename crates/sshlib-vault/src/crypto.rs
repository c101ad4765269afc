// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open operations and the per-field token format.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use sshlib_core::SshlibError;
use zeroize::Zeroizing;

/// AES-256-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Output of [`seal`] with the tag split off the ciphertext.
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

fn less_safe_key(key: &[u8; 32]) -> Result<LessSafeKey, SshlibError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| SshlibError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM under a random 96-bit nonce.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Sealed, SshlibError> {
    let key = less_safe_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill(&mut nonce)
        .map_err(|_| SshlibError::Internal("failed to generate random nonce".to_string()))?;

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut in_out)
        .map_err(|_| SshlibError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let tag_start = in_out.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&in_out[tag_start..]);
    in_out.truncate(tag_start);

    Ok(Sealed {
        nonce,
        tag,
        ciphertext: in_out,
    })
}

/// Decrypt and verify AES-256-GCM ciphertext.
///
/// Fails with [`SshlibError::Authentication`] when the key is wrong or any of
/// nonce, tag or ciphertext was altered.
pub fn open(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    tag: &[u8; TAG_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, SshlibError> {
    let key = less_safe_key(key)?;

    let mut in_out = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    in_out.extend_from_slice(ciphertext);
    in_out.extend_from_slice(tag);

    let plaintext = key
        .open_in_place(Nonce::assume_unique_for_key(*nonce), Aad::empty(), &mut in_out)
        .map_err(|_| {
            SshlibError::Authentication(
                "decryption failed -- wrong key or corrupted data".to_string(),
            )
        })?;

    Ok(plaintext.to_vec())
}

/// Fill a fixed-size buffer from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], SshlibError> {
    let mut buf = [0u8; N];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| SshlibError::Internal("system random source failed".to_string()))?;
    Ok(buf)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<Zeroizing<[u8; 32]>, SshlibError> {
    random_bytes::<32>().map(Zeroizing::new)
}

/// Encrypts and decrypts individual secret fields under the process-wide key.
///
/// Tokens are the standard base64 encoding of `nonce || tag || ciphertext`,
/// so each secret fits in a single text column. Cloning shares the key.
#[derive(Clone)]
pub struct FieldCipher {
    key: Arc<Zeroizing<[u8; 32]>>,
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl FieldCipher {
    pub fn new(key: Zeroizing<[u8; 32]>) -> Self {
        Self { key: Arc::new(key) }
    }

    /// Seal one secret. Never deterministic: each call draws a fresh nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, SshlibError> {
        let sealed = seal(&self.key, plaintext.as_bytes())?;
        let mut raw = Vec::with_capacity(NONCE_LEN + TAG_LEN + sealed.ciphertext.len());
        raw.extend_from_slice(&sealed.nonce);
        raw.extend_from_slice(&sealed.tag);
        raw.extend_from_slice(&sealed.ciphertext);
        Ok(BASE64.encode(raw))
    }

    /// Open a token produced by [`FieldCipher::encrypt`].
    pub fn decrypt(&self, token: &str) -> Result<String, SshlibError> {
        let raw = BASE64
            .decode(token.trim())
            .map_err(|_| SshlibError::Authentication("token is not valid base64".to_string()))?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(SshlibError::Authentication("token is truncated".to_string()));
        }

        let (nonce, rest) = raw.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| SshlibError::Authentication("token is truncated".to_string()))?;
        let tag: [u8; TAG_LEN] = tag
            .try_into()
            .map_err(|_| SshlibError::Authentication("token is truncated".to_string()))?;

        let plaintext = Zeroizing::new(open(&self.key, &nonce, &tag, ciphertext)?);
        String::from_utf8(plaintext.to_vec()).map_err(|_| {
            SshlibError::Authentication("decrypted value is not valid UTF-8".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::new(Zeroizing::new([7u8; 32]))
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = generate_random_key().unwrap();
        let sealed = seal(&key, b"secret host").unwrap();
        let plain = open(&key, &sealed.nonce, &sealed.tag, &sealed.ciphertext).unwrap();
        assert_eq!(plain, b"secret host");
    }

    #[test]
    fn ciphertext_has_plaintext_length() {
        let key = generate_random_key().unwrap();
        let sealed = seal(&key, b"hello").unwrap();
        assert_eq!(sealed.ciphertext.len(), 5);
    }

    #[test]
    fn open_with_wrong_key_is_authentication_error() {
        let sealed = seal(&[1u8; 32], b"secret data").unwrap();
        let result = open(&[2u8; 32], &sealed.nonce, &sealed.tag, &sealed.ciphertext);
        assert!(matches!(result, Err(SshlibError::Authentication(_))));
    }

    #[test]
    fn token_layout_is_nonce_tag_ciphertext() {
        let token = cipher().encrypt("root").unwrap();
        let raw = BASE64.decode(token).unwrap();
        assert_eq!(raw.len(), NONCE_LEN + TAG_LEN + "root".len());
    }

    #[test]
    fn encrypt_decrypt_empty_string() {
        let c = cipher();
        let token = c.encrypt("").unwrap();
        assert_eq!(c.decrypt(&token).unwrap(), "");
    }

    #[test]
    fn flipping_any_bit_fails_authentication() {
        let c = cipher();
        let token = c.encrypt("s3cret").unwrap();
        let raw = BASE64.decode(&token).unwrap();

        for byte in 0..raw.len() {
            for bit in 0..8 {
                let mut tampered = raw.clone();
                tampered[byte] ^= 1 << bit;
                let result = c.decrypt(&BASE64.encode(&tampered));
                assert!(
                    matches!(result, Err(SshlibError::Authentication(_))),
                    "byte {byte} bit {bit} was not detected"
                );
            }
        }
    }

    #[test]
    fn truncated_token_fails_authentication() {
        let c = cipher();
        let raw = BASE64.decode(c.encrypt("s3cret").unwrap()).unwrap();
        for len in [0, 11, 27, raw.len() - 1] {
            let result = c.decrypt(&BASE64.encode(&raw[..len]));
            assert!(matches!(result, Err(SshlibError::Authentication(_))), "len {len}");
        }
    }

    #[test]
    fn garbage_token_fails_authentication() {
        assert!(matches!(
            cipher().decrypt("not base64 at all!"),
            Err(SshlibError::Authentication(_))
        ));
    }

    #[test]
    fn other_key_cannot_decrypt() {
        let token = cipher().encrypt("10.0.0.5").unwrap();
        let other = FieldCipher::new(Zeroizing::new([8u8; 32]));
        assert!(matches!(other.decrypt(&token), Err(SshlibError::Authentication(_))));
    }

    #[test]
    fn debug_output_hides_key() {
        assert_eq!(format!("{:?}", cipher()), "FieldCipher { key: \"[REDACTED]\" }");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decrypt_inverts_encrypt(s in ".*") {
                let c = cipher();
                let token = c.encrypt(&s).unwrap();
                prop_assert_eq!(c.decrypt(&token).unwrap(), s);
            }

            #[test]
            fn encryption_is_not_deterministic(s in ".+") {
                let c = cipher();
                prop_assert_ne!(c.encrypt(&s).unwrap(), c.encrypt(&s).unwrap());
            }
        }
    }
}
