//! Encrypt-then-MAC sealing of raw bytes using AES-128-CBC + HMAC-SHA256
//!
//! The binary format is:
//! - iv: 16 bytes
//! - mac: 32 bytes (HMAC-SHA256 over the ciphertext; split key mode also
//!   covers the iv)
//! - ciphertext: variable length, a non-zero multiple of 16 (PKCS#7 padded)
//!
//! On open, the MAC is verified in constant time before any decryption is
//! attempted. All failures are reported as the same opaque decryption error.

use crate::error::{FieldsealError, Result};
use crate::keys::FieldKeys;
use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

/// Length of the initialization vector in bytes
pub const IV_LEN: usize = 16;

/// Length of the HMAC-SHA256 tag in bytes
pub const MAC_LEN: usize = 32;

/// AES block length in bytes
pub const BLOCK_LEN: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Seal plaintext under `keys` with a fresh random IV
///
/// Returns the binary format: iv(16) + mac(32) + ciphertext(variable)
pub fn encrypt(keys: &FieldKeys, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    encrypt_with_iv(keys, plaintext, &iv)
}

/// Seal plaintext under `keys` using the provided IV
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which draws a fresh IV.
pub fn encrypt_with_iv(keys: &FieldKeys, plaintext: &[u8], iv: &[u8; IV_LEN]) -> Result<Vec<u8>> {
    let ciphertext = Aes128CbcEnc::new_from_slices(keys.cipher_key(), iv)
        .map_err(|e| {
            FieldsealError::encryption_failed(format!("unable to initialize cipher: {e}"))
        })?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let tag = compute_mac(keys, iv, &ciphertext)
        .map_err(|_| FieldsealError::encryption_failed("unable to initialize mac"))?;

    let mut output = Vec::with_capacity(IV_LEN + MAC_LEN + ciphertext.len());
    output.extend_from_slice(iv);
    output.extend_from_slice(&tag);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Open a sealed binary blob under `keys`
pub fn decrypt(keys: &FieldKeys, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < IV_LEN + MAC_LEN {
        tracing::debug!(len = sealed.len(), "sealed input shorter than header");
        return Err(FieldsealError::decryption_failed());
    }
    let (iv, rest) = sealed.split_at(IV_LEN);
    let (tag, ciphertext) = rest.split_at(MAC_LEN);

    let mac = mac_over(keys, iv, ciphertext).map_err(|_| FieldsealError::decryption_failed())?;
    // verify_slice compares in constant time.
    if mac.verify_slice(tag).is_err() {
        tracing::debug!("mac verification failed");
        return Err(FieldsealError::decryption_failed());
    }

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        tracing::debug!(len = ciphertext.len(), "ciphertext not block aligned");
        return Err(FieldsealError::decryption_failed());
    }

    Aes128CbcDec::new_from_slices(keys.cipher_key(), iv)
        .map_err(|_| FieldsealError::decryption_failed())?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| {
            tracing::debug!("invalid padding after authenticated decryption");
            FieldsealError::decryption_failed()
        })
}

fn mac_over(
    keys: &FieldKeys,
    iv: &[u8],
    ciphertext: &[u8],
) -> std::result::Result<HmacSha256, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(keys.mac_key())?;
    if keys.mac_covers_iv() {
        mac.update(iv);
    }
    mac.update(ciphertext);
    Ok(mac)
}

fn compute_mac(
    keys: &FieldKeys,
    iv: &[u8],
    ciphertext: &[u8],
) -> std::result::Result<[u8; MAC_LEN], hmac::digest::InvalidLength> {
    Ok(mac_over(keys, iv, ciphertext)?.finalize().into_bytes().into())
}
