//! Ledger of destructive changes deferred by `PENDING_DROPS` changesets
//!
//! An entry is present exactly while its version's drops are outstanding.
//! Finalizing a version removes the entry rather than marking it resolved.

use super::Model;
use crate::migration::{
    Change, ChangeSet, Migration, MigrationError, MigrationVersion, Result,
};
use std::collections::BTreeMap;

/// Keyword accepted by [`PendingDrops::migration_for_version`] for the
/// oldest outstanding version.
pub const NEXT_VERSION: &str = "next";

/// Pending drops keyed by the version that deferred them, in version order.
#[derive(Debug, Clone, Default)]
pub struct PendingDrops {
    entries: BTreeMap<MigrationVersion, ChangeSet>,
}

impl PendingDrops {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the deferred changeset for `version`.
    ///
    /// A second changeset for an equal version replaces the first, and the
    /// entry is then reported under the newer spelling of the version.
    pub fn add(&mut self, version: MigrationVersion, change_set: ChangeSet) -> Option<ChangeSet> {
        let previous = self.entries.remove(&version);
        if previous.is_some() {
            log::warn!("Replacing pending drops recorded for version {}", version);
        }
        self.entries.insert(version, change_set);
        previous
    }

    /// Remove the entry for `version`. Removing an unknown version is a no-op.
    pub fn remove(&mut self, version: &MigrationVersion) -> Option<ChangeSet> {
        self.entries.remove(version)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains(&self, version: &MigrationVersion) -> bool {
        self.entries.contains_key(version)
    }

    /// Versions with outstanding drops, oldest first
    #[must_use]
    pub fn pending_drops(&self) -> Vec<String> {
        self.entries.keys().map(|v| v.as_str().to_string()).collect()
    }

    /// Build a migration that finalizes the drops of `pending_version`.
    ///
    /// `pending_version` may be [`NEXT_VERSION`] to pick the oldest entry.
    /// The result holds one ordinary changeset whose `dropsFor` is the pending
    /// version and whose changes are the deferred ones.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::NoPendingDrops` if nothing is pending for the
    /// version, or `MigrationError::InvalidVersion` if it is empty.
    pub fn migration_for_version(&self, pending_version: &str) -> Result<Migration> {
        let entry = if pending_version.eq_ignore_ascii_case(NEXT_VERSION) {
            self.entries.iter().next()
        } else {
            let version = MigrationVersion::parse(pending_version)?;
            self.entries.get_key_value(&version)
        };
        let (version, change_set) =
            entry.ok_or_else(|| MigrationError::NoPendingDrops(pending_version.to_string()))?;

        let finalizing = ChangeSet::drops_for(version.as_str(), change_set.changes.iter().cloned());
        Ok(Migration::new().with_change_set(finalizing))
    }

    /// Mark pending history-table column drops on a freshly built model.
    ///
    /// For every deferred DropColumn whose table is history tracked (flagged on
    /// the change, or `with_history` on the table in `new_model`), the column
    /// is registered as a pending drop on `new_model`'s table so consumers do
    /// not treat it as stable or propose dropping it again.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::TableNotFound` if a flagged drop targets a
    /// table missing from `new_model`.
    pub fn register_pending_history_drop_columns(&self, new_model: &mut Model) -> Result<()> {
        let drops = self
            .entries
            .values()
            .flat_map(ChangeSet::changes)
            .filter_map(|change| match change {
                Change::DropColumn(drop) => Some(drop),
                _ => None,
            });

        for drop in drops {
            let history_tracked = new_model
                .get_table(&drop.table_name)
                .is_some_and(|table| table.with_history());

            if drop.is_with_history() || history_tracked {
                new_model.register_pending_drop_column(drop)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::DropColumn;

    fn version(raw: &str) -> MigrationVersion {
        MigrationVersion::parse(raw).unwrap()
    }

    fn drop_status() -> ChangeSet {
        ChangeSet::pending_drops([DropColumn::new("order", "status").into()])
    }

    #[test]
    fn test_pending_drops_are_version_ordered() {
        let mut ledger = PendingDrops::new();
        ledger.add(version("1.10"), drop_status());
        ledger.add(version("1.2"), drop_status());
        ledger.add(version("1.9"), drop_status());
        assert_eq!(ledger.pending_drops(), ["1.2", "1.9", "1.10"]);
    }

    #[test]
    fn test_add_overwrites_existing_version() {
        let mut ledger = PendingDrops::new();
        assert!(ledger.add(version("1.1"), drop_status()).is_none());

        let replacement = ChangeSet::pending_drops([DropColumn::new("order", "total").into()]);
        assert!(ledger.add(version("1.1"), replacement.clone()).is_some());
        assert_eq!(ledger.len(), 1);

        let migration = ledger.migration_for_version("1.1").unwrap();
        assert_eq!(migration.change_sets()[0].changes, replacement.changes);
    }

    #[test]
    fn test_add_reports_latest_version_spelling() {
        let mut ledger = PendingDrops::new();
        ledger.add(version("1.1"), drop_status());
        ledger.add(version("V1_1__retry"), drop_status());

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending_drops(), ["1_1"]);
        let migration = ledger.migration_for_version("next").unwrap();
        assert_eq!(migration.change_sets()[0].finalizes(), Some("1_1"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut ledger = PendingDrops::new();
        ledger.add(version("1.1"), drop_status());

        assert!(ledger.remove(&version("1.1")).is_some());
        assert!(ledger.remove(&version("1.1")).is_none());
        assert!(ledger.remove(&version("9.9")).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_migration_for_next_version() {
        let mut ledger = PendingDrops::new();
        ledger.add(version("2.0"), drop_status());
        ledger.add(version("1.4"), drop_status());

        let migration = ledger.migration_for_version("NEXT").unwrap();
        let change_set = &migration.change_sets()[0];
        assert!(!change_set.is_pending_drops());
        assert_eq!(change_set.finalizes(), Some("1.4"));
        assert_eq!(change_set.changes, drop_status().changes);
    }

    #[test]
    fn test_migration_for_unknown_version() {
        let ledger = PendingDrops::new();
        assert!(matches!(
            ledger.migration_for_version("next"),
            Err(MigrationError::NoPendingDrops(_))
        ));
        assert!(matches!(
            ledger.migration_for_version("1.1"),
            Err(MigrationError::NoPendingDrops(v)) if v == "1.1"
        ));
    }
}
