//! Per-owner authenticated field cipher
//!
//! [`FieldCipher`] is the entry point the storage layer uses: it turns a
//! plaintext value plus the id of its owner into a blob string, and back.
//! It holds only its immutable [`KeyMode`]; keys are derived on every call, so
//! a single instance can be shared freely across threads.
//!
//! In the default [`KeyMode::Legacy`] the MAC covers the ciphertext but not
//! the IV. A blob whose IV bytes were altered still authenticates and opens
//! to a plaintext with a modified first block. Any other change is rejected.
//! Use [`KeyMode::Split`] where every modification must be detected; it
//! authenticates the IV as well, at the cost of not reading legacy blobs.

use crate::armor;
use crate::error::{FieldsealError, Result};
use crate::fieldcrypt;
use crate::keys::{FieldKeys, KeyMode};
use crate::owner::OwnerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldCipher {
    mode: KeyMode,
}

impl FieldCipher {
    pub fn new(mode: KeyMode) -> Self {
        Self { mode }
    }

    /// The key mode this cipher seals and opens with.
    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Seal `plaintext` for `owner`, returning the blob to persist.
    ///
    /// Fails only if the cipher primitive fails, with an error for which
    /// [`FieldsealError::is_encryption_failure`] holds.
    pub fn encrypt(&self, owner: &OwnerId, plaintext: &[u8]) -> Result<String> {
        let keys = FieldKeys::derive(owner, self.mode)?;
        let sealed = fieldcrypt::encrypt(&keys, plaintext)?;
        tracing::debug!(mode = %self.mode, len = plaintext.len(), "sealed field");
        Ok(armor::wrap(&sealed))
    }

    pub fn encrypt_str(&self, owner: &OwnerId, plaintext: &str) -> Result<String> {
        self.encrypt(owner, plaintext.as_bytes())
    }

    /// Open a blob previously produced by [`FieldCipher::encrypt`] for the same owner.
    ///
    /// Malformed blobs, tampering and the wrong owner all fail with the same
    /// decryption error. In legacy mode, tampering confined to the IV is not
    /// detected (see the module docs).
    pub fn decrypt(&self, owner: &OwnerId, blob: &str) -> Result<Vec<u8>> {
        let keys = FieldKeys::derive(owner, self.mode)?;
        let sealed = armor::unwrap(blob)?;
        fieldcrypt::decrypt(&keys, &sealed)
    }

    /// Like [`FieldCipher::decrypt`], for values that were UTF-8 text when sealed.
    pub fn decrypt_string(&self, owner: &OwnerId, blob: &str) -> Result<String> {
        let plaintext = self.decrypt(owner, blob)?;
        String::from_utf8(plaintext).map_err(|_| FieldsealError::decryption_failed())
    }
}
