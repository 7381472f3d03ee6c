//! Checksum calculation for migrations

use crate::migration::{Migration, MigrationError, MigrationVersion, Result};
use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of a migration
///
/// The migration is hashed in its canonical JSON form, so two documents that
/// describe the same changes hash identically regardless of how the loader
/// read them. Used to detect a migration that was edited after it was
/// recorded.
///
/// # Errors
///
/// Returns `MigrationError::Serialization` if the migration cannot be
/// serialized.
pub fn calculate_checksum(migration: &Migration) -> Result<String> {
    let content = serde_json::to_vec(migration)?;

    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = hasher.finalize();

    Ok(format!("{:x}", hash))
}

/// Validate a checksum against the stored value
///
/// # Errors
///
/// Returns `MigrationError::ChecksumMismatch` if the checksums differ.
pub fn validate_checksum(version: &MigrationVersion, stored: &str, current: &str) -> Result<()> {
    if stored == current {
        Ok(())
    } else {
        Err(MigrationError::ChecksumMismatch {
            version: version.to_string(),
            stored: stored.to_string(),
            current: current.to_string(),
        })
    }
}
