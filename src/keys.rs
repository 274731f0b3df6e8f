//! Per-owner key derivation
//!
//! Both modes start from the same key material: the lowercase hex SHA-1
//! digest of the owner id's string form (40 ASCII bytes). They differ in how
//! the cipher and MAC keys are taken from it:
//!
//! - [`KeyMode::Legacy`]: the AES-128 key is the first 16 bytes of the hex
//!   text and the HMAC key is the whole 40-byte text. This is what existing
//!   stored blobs were sealed with, so it stays the default.
//! - [`KeyMode::Split`]: two independent subkeys are expanded from the key
//!   material with HKDF-SHA256, and the MAC also covers the IV. Blobs keep
//!   the same layout but are not readable in legacy mode.
//!
//! Neither mode is salted or keyed; owner ids are a small space and the keys
//! can be recovered by brute force from a blob. New deployments should move
//! to a keyed derivation through a new mode rather than by changing these.

use crate::error::{ErrorCategory, ErrorKind, FieldsealError, Result};
use crate::owner::OwnerId;
use hkdf::Hkdf;
use sha1::{Digest, Sha1};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// AES-128 key length in bytes
pub const CIPHER_KEY_LEN: usize = 16;

/// Length of the hex SHA-1 key material in bytes
const KEY_MATERIAL_LEN: usize = 40;

/// HMAC key length in split mode (one SHA-256 output)
const SPLIT_MAC_KEY_LEN: usize = 32;

const HKDF_INFO_CIPHER: &[u8] = b"fieldseal-cbc-key-v1";
const HKDF_INFO_MAC: &[u8] = b"fieldseal-hmac-key-v1";

/// How cipher and MAC keys are obtained from an owner id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// One key reused for encryption and authentication. Compatible with
    /// existing stored data.
    #[default]
    Legacy,
    /// Independent HKDF-SHA256 subkeys for encryption and authentication.
    Split,
}

impl KeyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyMode::Legacy => "legacy",
            KeyMode::Split => "split",
        }
    }
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyMode {
    type Err = FieldsealError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "legacy" => Ok(KeyMode::Legacy),
            "split" => Ok(KeyMode::Split),
            other => Err(FieldsealError::new(
                ErrorCategory::User,
                format!("unknown key mode {other:?} (expected \"legacy\" or \"split\")"),
            )),
        }
    }
}

/// Keys for one owner. Wiped from memory on drop.
pub struct FieldKeys {
    mode: KeyMode,
    cipher_key: Zeroizing<[u8; CIPHER_KEY_LEN]>,
    mac_key: Zeroizing<Vec<u8>>,
}

impl FieldKeys {
    /// Derive the keys for `owner` under `mode`.
    ///
    /// Pure function of its inputs: the same owner always yields the same keys.
    pub fn derive(owner: &OwnerId, mode: KeyMode) -> Result<Self> {
        let material = key_material(owner)?;
        match mode {
            KeyMode::Legacy => {
                let mut cipher_key = Zeroizing::new([0u8; CIPHER_KEY_LEN]);
                cipher_key.copy_from_slice(&material[..CIPHER_KEY_LEN]);
                Ok(Self {
                    mode,
                    cipher_key,
                    mac_key: Zeroizing::new(material.to_vec()),
                })
            }
            KeyMode::Split => {
                let hkdf = Hkdf::<Sha256>::new(None, &material[..]);

                let mut cipher_key = Zeroizing::new([0u8; CIPHER_KEY_LEN]);
                hkdf.expand(HKDF_INFO_CIPHER, &mut cipher_key[..])
                    .map_err(|e| hkdf_error("cipher", e))?;

                let mut mac_key = Zeroizing::new(vec![0u8; SPLIT_MAC_KEY_LEN]);
                hkdf.expand(HKDF_INFO_MAC, &mut mac_key[..])
                    .map_err(|e| hkdf_error("mac", e))?;

                Ok(Self {
                    mode,
                    cipher_key,
                    mac_key,
                })
            }
        }
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Whether the MAC input is `iv || ciphertext` rather than the ciphertext alone.
    pub(crate) fn mac_covers_iv(&self) -> bool {
        self.mode == KeyMode::Split
    }

    pub(crate) fn cipher_key(&self) -> &[u8; CIPHER_KEY_LEN] {
        &self.cipher_key
    }

    pub(crate) fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }
}

fn key_material(owner: &OwnerId) -> Result<Zeroizing<[u8; KEY_MATERIAL_LEN]>> {
    let digest = Sha1::digest(owner.as_bytes());
    let mut material = Zeroizing::new([0u8; KEY_MATERIAL_LEN]);
    hex::encode_to_slice(digest, &mut material[..]).map_err(|e| {
        FieldsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "failed to hex encode owner digest",
            e,
        )
    })?;
    Ok(material)
}

fn hkdf_error(which: &str, e: hkdf::InvalidLength) -> FieldsealError {
    FieldsealError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::InternalInvariant,
        format!("failed to expand {which} subkey"),
        e,
    )
}
