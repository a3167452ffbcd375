// ABOUTME: AES-256-GCM encryption at rest for tenant database connection passwords
// ABOUTME: Nonce-prepended-to-ciphertext, base64 encoded, with a reserved version byte
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Encryption for tenant database passwords at rest (C1 Credential Store).
//!
//! Layout of the stored blob, before base64: `[version:1][nonce:12][ciphertext+tag]`.
//! Version `0x01` is the only defined version; an unrecognised version byte is
//! treated as corrupt/foreign data rather than silently accepted.

use crate::errors::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

const VERSION: u8 = 0x01;

/// Derive a 32-byte `AES-256-GCM` key from the configured `ENCRYPTION_KEY` secret.
///
/// Accepts a key of any length (the configured secret is a deployer-chosen
/// string, not necessarily 32 raw bytes) and folds it down via `SHA-256`.
fn derive_key(encryption_key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(encryption_key.as_bytes());
    hasher.finalize().into()
}

/// Encrypt a plaintext secret for storage, returning a base64-encoded blob.
///
/// # Errors
///
/// Returns an error if the underlying `AEAD` seal operation fails.
pub fn encrypt_secret(plaintext: &str, encryption_key: &str) -> AppResult<String> {
    let key_bytes = derive_key(encryption_key);
    let rng = SystemRandom::new();

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| AppError::internal("failed to generate encryption nonce"))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let unbound_key = UnboundKey::new(&AES_256_GCM, &key_bytes)
        .map_err(|_| AppError::internal("invalid encryption key length"))?;
    let key = LessSafeKey::new(unbound_key);

    let mut data = plaintext.as_bytes().to_vec();
    key.seal_in_place_append_tag(nonce, Aad::empty(), &mut data)
        .map_err(|_| AppError::internal("encryption failed"))?;

    let mut blob = Vec::with_capacity(1 + NONCE_LEN + data.len());
    blob.push(VERSION);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend(data);

    Ok(general_purpose::STANDARD.encode(blob))
}

/// Decrypt a base64-encoded blob produced by [`encrypt_secret`].
///
/// # Errors
///
/// Returns an error if the blob is malformed, carries an unrecognised version
/// byte, or fails `AEAD` authentication (wrong key or tampered ciphertext).
pub fn decrypt_secret(encoded: &str, encryption_key: &str) -> AppResult<String> {
    let blob = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AppError::invalid_input(format!("invalid encrypted blob: {e}")))?;

    if blob.len() < 1 + NONCE_LEN {
        return Err(AppError::invalid_input("encrypted blob too short"));
    }

    let (version, rest) = blob.split_at(1);
    if version[0] != VERSION {
        return Err(AppError::invalid_input(format!(
            "unsupported encryption version: {}",
            version[0]
        )));
    }

    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
    let nonce_array: [u8; NONCE_LEN] = nonce_bytes
        .try_into()
        .map_err(|_| AppError::invalid_input("invalid nonce length"))?;
    let nonce = Nonce::assume_unique_for_key(nonce_array);

    let key_bytes = derive_key(encryption_key);
    let unbound_key = UnboundKey::new(&AES_256_GCM, &key_bytes)
        .map_err(|_| AppError::internal("invalid encryption key length"))?;
    let key = LessSafeKey::new(unbound_key);

    let mut data = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut data)
        .map_err(|_| AppError::invalid_input("decryption failed: wrong key or tampered data"))?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|e| AppError::invalid_input(format!("decrypted data is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = "a test encryption key that is long enough";
        let encrypted = encrypt_secret("s3cr3t-password", key).expect("encrypt");
        let decrypted = decrypt_secret(&encrypted, key).expect("decrypt");
        assert_eq!(decrypted, "s3cr3t-password");
    }

    #[test]
    fn wrong_key_fails() {
        let encrypted = encrypt_secret("s3cr3t-password", "key-one").expect("encrypt");
        assert!(decrypt_secret(&encrypted, "key-two").is_err());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut blob = vec![0xFFu8];
        blob.extend_from_slice(&[0u8; NONCE_LEN]);
        blob.extend_from_slice(b"ciphertext");
        let encoded = general_purpose::STANDARD.encode(blob);
        assert!(decrypt_secret(&encoded, "any-key").is_err());
    }

    #[test]
    fn rejects_truncated_blob() {
        let encoded = general_purpose::STANDARD.encode([VERSION]);
        assert!(decrypt_secret(&encoded, "any-key").is_err());
    }
}
