//! Migration-specific error types

/// Errors raised while applying migrations to a [`crate::Model`].
///
/// Every variant is fatal for the `apply` call that produced it. The model is
/// left in whatever partial state the failing changeset reached; callers are
/// expected to stop replaying and rebuild from a known-good version.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// CreateTable targeted a table already in the model
    #[error("Table [{0}] already exists in model")]
    TableAlreadyExists(String),

    /// A change targeted a table missing from the model
    #[error("Table [{0}] does not exist in model")]
    TableNotFound(String),

    /// AddColumn targeted a column already on the table
    #[error("Column [{column}] already exists in table [{table}]")]
    ColumnAlreadyExists { table: String, column: String },

    /// AlterColumn/DropColumn targeted a column missing from the table
    #[error("Column [{column}] does not exist in table [{table}]")]
    ColumnNotFound { table: String, column: String },

    /// CreateIndex targeted an index already in the model
    #[error("Index [{0}] already exists in model")]
    IndexAlreadyExists(String),

    /// DropIndex targeted an index missing from the model
    #[error("Index [{0}] does not exist in model")]
    IndexNotFound(String),

    /// A version string could not be parsed
    #[error("Invalid migration version: {0}")]
    InvalidVersion(String),

    /// No pending drops are recorded for the requested version
    #[error("No 'pendingDrops' changeSets for migration version [{0}] found")]
    NoPendingDrops(String),

    /// Migrations were replayed out of version order
    #[error("Migration version {version} must be greater than previously applied version {previous}")]
    OutOfOrder { previous: String, version: String },

    /// A migration's content changed after it was recorded
    #[error(
        "Migration version {version} has been modified after being recorded.\n\
         Stored checksum: {stored}\n\
         Current checksum: {current}"
    )]
    ChecksumMismatch {
        version: String,
        stored: String,
        current: String,
    },

    /// Canonical serialization of a migration failed
    #[error("Failed to serialize migration: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MigrationError {
    /// True for the "already exists" / "does not exist" family raised by
    /// existence checks against the model.
    #[must_use]
    pub fn is_schema_conflict(&self) -> bool {
        self.is_already_exists() || self.is_not_found()
    }

    /// True when a create/add targeted something already present.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            MigrationError::TableAlreadyExists(_)
                | MigrationError::ColumnAlreadyExists { .. }
                | MigrationError::IndexAlreadyExists(_)
        )
    }

    /// True when a drop/alter targeted something absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MigrationError::TableNotFound(_)
                | MigrationError::ColumnNotFound { .. }
                | MigrationError::IndexNotFound(_)
        )
    }
}

/// Result alias used throughout the migration model.
pub type Result<T> = std::result::Result<T, MigrationError>;
