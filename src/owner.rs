//! Owner identifiers
//!
//! An owner is whoever a sealed field belongs to (in practice a numeric user
//! id). The identifier is not secret and is never stored next to the blob; it
//! is only used as key derivation input, through its canonical string form.

use crate::error::{ErrorCategory, ErrorKind, FieldsealError, Result};
use std::fmt;
use std::str::FromStr;

/// Opaque, stable identifier of the owner of a sealed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    /// Build an owner id from an arbitrary string form.
    ///
    /// The string is used verbatim, so surrounding whitespace is rejected
    /// rather than silently deriving another owner's keys. Integer ids should
    /// go through the `From` impls so that they render in decimal exactly like
    /// stored data expects.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(FieldsealError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidOwner,
                "owner id must not be empty",
            ));
        }
        if id.trim() != id {
            return Err(FieldsealError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidOwner,
                format!("owner id {id:?} has leading or trailing whitespace"),
            ));
        }
        Ok(Self(id))
    }

    /// Canonical string form fed to key derivation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

macro_rules! owner_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for OwnerId {
                fn from(id: $t) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

owner_from_int!(u16, u32, u64, i32, i64, usize);

impl FromStr for OwnerId {
    type Err = FieldsealError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_renders_decimal() {
        assert_eq!(OwnerId::from(42u64).as_str(), "42");
        assert_eq!(OwnerId::from(-7i64).as_str(), "-7");
        assert_eq!(OwnerId::from(0u32).as_str(), "0");
    }

    #[test]
    fn test_parsed_matches_integer() {
        let parsed: OwnerId = "42".parse().unwrap();
        assert_eq!(parsed, OwnerId::from(42u32));
        assert_eq!(parsed.to_string(), "42");
    }

    #[test]
    fn test_empty_rejected() {
        let err = "".parse::<OwnerId>().expect_err("expected empty owner to fail");
        assert_eq!(err.kind, Some(ErrorKind::InvalidOwner));
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        for raw in [" 42", "42 ", "42\n", "\t42"] {
            let err = raw.parse::<OwnerId>().expect_err("expected padded owner to fail");
            assert_eq!(err.kind, Some(ErrorKind::InvalidOwner), "{raw:?}");
        }
        assert!(OwnerId::new("   ").is_err());
    }

    #[test]
    fn test_string_used_verbatim() {
        let owner = OwnerId::new("user-0001").unwrap();
        assert_eq!(owner.as_str(), "user-0001");
    }
}
