//! File encryption/decryption operations
//!
//! This module provides high-level operations on field values kept in files:
//! one plaintext value per file on one side, one blob string per file on the
//! other.

use crate::cipher::FieldCipher;
use crate::error::{ErrorCategory, ErrorKind, FieldsealError, Result};
use crate::item::{ItemView, SealedItem};
use crate::owner::OwnerId;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt a file's contents for an owner
///
/// Reads plaintext from `input_path`, seals it for `owner`, and writes the
/// blob to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    owner: &OwnerId,
    cipher: &FieldCipher,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let blob = cipher
        .encrypt(owner, &plaintext)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, blob.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

/// Decrypt a blob file for an owner
///
/// Reads the blob from `input_path`, opens it for `owner`, and writes the
/// plaintext to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    owner: &OwnerId,
    cipher: &FieldCipher,
) -> Result<()> {
    let blob = read_blob(input_path)?;
    let plaintext = cipher
        .decrypt(owner, &blob)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Replace a blob file with a new value for the same owner
///
/// This function:
/// 1. Opens the existing blob at `crypt_path` to check it belongs to `owner`
/// 2. Reads new plaintext from `plain_path`
/// 3. Seals the new plaintext for `owner`
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// The atomic write ensures that either the old file or the new file exists,
/// never a partial/corrupted file.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    owner: &OwnerId,
    cipher: &FieldCipher,
) -> Result<()> {
    let blob = read_blob(crypt_path)?;

    // Refuse to overwrite a value this owner cannot read.
    cipher
        .decrypt(owner, &blob)
        .map_err(|e| e.with_context("failed to decrypt"))?;

    let crypt_dir = crypt_path.parent().ok_or_else(|| {
        FieldsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::Io,
            "crypt_path has no parent directory",
        )
    })?;
    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir).map_err(|e| {
        FieldsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to create tempfile",
            e,
        )
    })?;
    let new_plaintext = fs::read(plain_path).map_err(|e| read_error(plain_path, e))?;
    let new_blob = cipher
        .encrypt(owner, &new_plaintext)
        .map_err(|e| e.with_context("failed to encrypt"))?;

    temp_file.write_all(new_blob.as_bytes()).map_err(|e| {
        FieldsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        FieldsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        FieldsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| {
                FieldsealError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to get tempfile metadata",
                    e,
                )
            })?
            .permissions();
        perms.set_mode(0o600);
        temp_file.as_file().set_permissions(perms).map_err(|e| {
            FieldsealError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to set tempfile permissions",
                e,
            )
        })?;
    }
    temp_file.persist(crypt_path).map_err(|e| {
        FieldsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", crypt_path.display()),
            e,
        )
    })?;
    tracing::debug!(path = %crypt_path.display(), "replaced sealed value");
    Ok(())
}

/// Build the display view of a blob file
///
/// Unlike [`decrypt_file`], an unreadable blob is not an error: the view
/// carries no data instead. Failing to read the file at all still is.
pub fn view_file(
    input_path: &Path,
    id: Option<u64>,
    owner: &OwnerId,
    cipher: &FieldCipher,
) -> Result<ItemView> {
    let item = SealedItem {
        id,
        owner: owner.clone(),
        data: read_blob(input_path)?,
    };
    Ok(ItemView::from_sealed(cipher, &item))
}

/// Read a blob file, dropping trailing whitespace left by editors and shells.
fn read_blob(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    let mut blob = String::from_utf8(bytes).map_err(|e| {
        FieldsealError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("{} is not valid UTF-8", path.display()),
            e,
        )
    })?;
    let trimmed_len = blob.trim_end().len();
    blob.truncate(trimmed_len);
    Ok(blob)
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                FieldsealError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            FieldsealError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            FieldsealError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> FieldsealError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    FieldsealError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
