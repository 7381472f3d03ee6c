//! Replay - builds a model by applying migrations in version order

use crate::migration::{
    calculate_checksum, validate_checksum, Migration, MigrationError, MigrationVersion, Result,
};
use crate::model::Model;

/// Drives a [`Model`] through an ordered sequence of migration versions.
///
/// Each version must be strictly greater than the one before it. Draft
/// references are adjusted once, when the replay is finished.
#[derive(Debug, Default)]
pub struct Replay {
    model: Model,
    applied: Vec<MigrationVersion>,
}

impl Replay {
    /// Start a replay from an existing model (empty or seeded)
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self {
            model,
            applied: Vec::new(),
        }
    }

    /// Apply the next migration version
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::OutOfOrder` if `version` is not greater than
    /// the last applied version, or any error raised applying the migration.
    pub fn apply(&mut self, version: MigrationVersion, migration: &Migration) -> Result<()> {
        if let Some(previous) = self.applied.last() {
            if version <= *previous {
                return Err(MigrationError::OutOfOrder {
                    previous: previous.to_string(),
                    version: version.to_string(),
                });
            }
        }

        log::info!(
            "Applying migration version {} ({} changeset(s))",
            version,
            migration.change_sets().len()
        );
        self.model.apply(migration, &version)?;
        self.applied.push(version);
        Ok(())
    }

    /// Apply the next migration after checking it against its recorded checksum
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::ChecksumMismatch` if the migration changed
    /// since `stored_checksum` was recorded, otherwise as [`Replay::apply`].
    pub fn apply_verified(
        &mut self,
        version: MigrationVersion,
        migration: &Migration,
        stored_checksum: &str,
    ) -> Result<()> {
        let current = calculate_checksum(migration)?;
        validate_checksum(&version, stored_checksum, &current)?;
        self.apply(version, migration)
    }

    /// Versions applied so far, in order
    #[must_use]
    pub fn applied_versions(&self) -> &[MigrationVersion] {
        &self.applied
    }

    #[must_use]
    pub fn last_version(&self) -> Option<&MigrationVersion> {
        self.applied.last()
    }

    /// The model as replayed so far, before draft adjustment
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Finish the replay: adjust draft references and return the model
    #[must_use]
    pub fn finish(mut self) -> Model {
        self.model.adjust_draft_references();
        self.model
    }
}
