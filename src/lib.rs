//! Fieldseal - per-owner authenticated encryption of stored item fields
//!
//! Values are sealed with AES-128-CBC and authenticated with HMAC-SHA256
//! (encrypt-then-MAC), using keys derived from the owning user's id. The
//! persisted form is `base64(iv || mac || ciphertext)`.

#![forbid(unsafe_code)]

pub mod armor;
pub mod cipher;
pub mod error;
pub mod fieldcrypt;
pub mod file_ops;
pub mod item;
pub mod keys;
pub mod owner;

pub use cipher::FieldCipher;
pub use error::{ErrorCategory, ErrorKind, FieldsealError, Result};
pub use keys::KeyMode;
pub use owner::OwnerId;
