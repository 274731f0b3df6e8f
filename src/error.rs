use std::error::Error as StdError;

use thiserror::Error;

/// Message carried by every decryption failure, whatever its cause.
pub(crate) const DECRYPTION_FAILED_MSG: &str = "unable to decrypt data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee that the error is not caused by
    /// the caller, only that the code cannot tell.
    Internal,

    /// The caller provided invalid input, or the stored data cannot be opened
    /// with the supplied owner.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The cipher primitive failed to produce ciphertext. The write that
    /// requested it should be aborted.
    EncryptionFailed,
    /// A blob could not be opened. Malformed or truncated input, a MAC
    /// mismatch (tampering or wrong owner) and padding failures all map here
    /// and are indistinguishable to the caller.
    DecryptionFailed,
    /// The owner identifier has no usable string form.
    InvalidOwner,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
    /// Unexpected state reached within fieldseal logic.
    InternalInvariant,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct FieldsealError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl FieldsealError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The opaque decryption failure.
    ///
    /// Deliberately carries no source: the cause must not leak to callers.
    pub(crate) fn decryption_failed() -> Self {
        Self::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            DECRYPTION_FAILED_MSG,
        )
    }

    pub(crate) fn encryption_failed(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorCategory::Internal, ErrorKind::EncryptionFailed, msg)
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// True if this error (or the error it wraps) reports an unreadable blob.
    ///
    /// Readers use this to substitute an empty value for a single corrupted
    /// record instead of failing a whole listing.
    pub fn is_decryption_failure(&self) -> bool {
        self.kind == Some(ErrorKind::DecryptionFailed)
    }

    /// True if the cipher failed while sealing a value.
    pub fn is_encryption_failure(&self) -> bool {
        self.kind == Some(ErrorKind::EncryptionFailed)
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FieldsealError>;
