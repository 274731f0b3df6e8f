//! Text armoring for sealed fields
//!
//! A sealed field is persisted as a single string: the standard-alphabet
//! base64 encoding (with padding) of the binary layout produced by
//! [`crate::fieldcrypt`]. The string is stored and handed back verbatim, so
//! decoding is strict and any malformed input is an ordinary decryption
//! failure.

use crate::error::{FieldsealError, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Wrap sealed bytes, returning the blob string
pub fn wrap(body: &[u8]) -> String {
    STANDARD.encode(body)
}

/// Unwrap a blob string, returning the sealed bytes
pub fn unwrap(blob: &str) -> Result<Vec<u8>> {
    STANDARD.decode(blob).map_err(|e| {
        tracing::debug!(error = %e, "blob is not valid base64");
        FieldsealError::decryption_failed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_empty_bytes() {
        assert_eq!(wrap(b""), "");
        assert_eq!(unwrap("").unwrap(), b"");
    }

    #[test]
    fn test_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        let armored = wrap(&bytes);

        // Standard alphabet, not URL safe.
        assert!(armored.contains('+'));
        assert!(armored.contains('/'));
        assert!(armored.ends_with("=="));
        assert_eq!(unwrap(&armored).unwrap(), bytes);
    }

    #[test]
    fn test_padding_kept() {
        assert_eq!(wrap(b"Some text"), "U29tZSB0ZXh0");
        assert_eq!(wrap(b"5.75"), "NS43NQ==");
    }

    #[test]
    fn test_bad_base64() {
        let err = unwrap("bad$$").expect_err("expected decode failure");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_url_safe_alphabet_rejected() {
        let err = unwrap("-_-_").expect_err("expected decode failure");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_missing_padding_rejected() {
        assert!(unwrap("NS43NQ").is_err());
    }
}
