//! Logical schema model
//!
//! Holds all the tables and non-unique, non-foreign-key indexes of a schema,
//! plus the ledger of deferred drops. Migrations are applied to the model in
//! version order:
//!
//! - a `PendingDrops` changeset is filed into the ledger and does not touch
//!   the tables;
//! - a changeset with `dropsFor` clears that version's ledger entry and is
//!   then applied like any other;
//! - every other changeset is applied change by change.
//!
//! # Example
//!
//! ```rust
//! use tidemark::migration::{AddHistoryTable, ChangeSet, CreateTable, DropColumn, Migration, MigrationVersion};
//! use tidemark::model::{Column, Model};
//!
//! let mut model = Model::new();
//!
//! let create = Migration::new().with_change_set(ChangeSet::apply([
//!     CreateTable::new("order", [Column::new("id", "bigint"), Column::new("status", "varchar(10)")]).into(),
//!     AddHistoryTable::new("order").into(),
//! ]));
//! model.apply(&create, &MigrationVersion::parse("1.0")?)?;
//!
//! let defer = Migration::new().with_change_set(ChangeSet::pending_drops([
//!     DropColumn::new("order", "status").into(),
//! ]));
//! model.apply(&defer, &MigrationVersion::parse("1.1")?)?;
//!
//! assert!(model.get_table("order").unwrap().column("status").is_some());
//! assert_eq!(model.pending_drops(), ["1.1"]);
//! # Ok::<(), tidemark::migration::MigrationError>(())
//! ```

mod column;
mod index;
mod pending_drops;
mod table;

pub use column::Column;
pub use index::Index;
pub use pending_drops::{PendingDrops, NEXT_VERSION};
pub use table::Table;

use crate::config::ModelConfig;
use crate::migration::{
    AddColumn, AddHistoryTable, AlterColumn, Change, ChangeSet, CreateIndex, CreateTable,
    DropColumn, DropHistoryTable, DropIndex, DropTable, Migration, MigrationError,
    MigrationVersion, Result,
};
use indexmap::IndexMap;

/// Tables, indexes and pending drops of one schema.
///
/// A model is owned by a single replay session and mutated in place by
/// [`Model::apply`]. After a failed apply its contents are undefined.
#[derive(Debug, Clone, Default)]
pub struct Model {
    config: ModelConfig,

    /// All the tables in the model
    tables: IndexMap<String, Table>,

    /// All the non unique non foreign key indexes
    indexes: IndexMap<String, Index>,

    pending_drops: PendingDrops,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[must_use]
    pub fn tables(&self) -> &IndexMap<String, Table> {
        &self.tables
    }

    #[must_use]
    pub fn indexes(&self) -> &IndexMap<String, Index> {
        &self.indexes
    }

    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }

    /// Add a table without validation, returning any table it replaced.
    ///
    /// Used when seeding the model from database metadata.
    pub fn add_table(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    /// Add a single or multi column index without validation.
    pub fn add_index<I, S>(&mut self, name: impl Into<String>, table: impl Into<String>, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = Index::new(name, table, columns);
        self.indexes.insert(index.name().to_string(), index);
    }

    #[must_use]
    pub fn pending_drops_ledger(&self) -> &PendingDrops {
        &self.pending_drops
    }

    #[must_use]
    pub fn has_pending_drops(&self) -> bool {
        !self.pending_drops.is_empty()
    }

    /// Versions containing un-applied pending drops, oldest first
    #[must_use]
    pub fn pending_drops(&self) -> Vec<String> {
        self.pending_drops.pending_drops()
    }

    /// The migration that finalizes the pending drops of a version.
    ///
    /// # Errors
    ///
    /// See [`PendingDrops::migration_for_version`].
    pub fn migration_for_pending_drop(&self, pending_version: &str) -> Result<Migration> {
        self.pending_drops.migration_for_version(pending_version)
    }

    /// Register this model's pending history drop columns on `new_model`.
    ///
    /// # Errors
    ///
    /// See [`PendingDrops::register_pending_history_drop_columns`].
    pub fn register_pending_history_drop_columns(&self, new_model: &mut Model) -> Result<()> {
        self.pending_drops
            .register_pending_history_drop_columns(new_model)
    }

    /// Register a drop column that has not been applied yet.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::TableNotFound` if the table is absent.
    pub fn register_pending_drop_column(&mut self, drop: &DropColumn) -> Result<()> {
        self.table_mut(&drop.table_name)?
            .register_pending_drop_column(&drop.column_name);
        Ok(())
    }

    /// Apply a migration with its changesets to the model.
    ///
    /// # Errors
    ///
    /// Fails on the first change whose existence check does not hold. The
    /// model is not rolled back. A `dropsFor` reference that names no
    /// outstanding version leaves the ledger unchanged.
    pub fn apply(&mut self, migration: &Migration, version: &MigrationVersion) -> Result<()> {
        for change_set in migration.change_sets() {
            if change_set.is_pending_drops() {
                log::debug!(
                    "Deferring {} pending drop(s) for version {}",
                    change_set.changes.len(),
                    version
                );
                self.pending_drops.add(version.clone(), change_set.clone());
                continue;
            }

            if let Some(drops_for) = change_set.finalizes() {
                match MigrationVersion::parse(drops_for) {
                    Ok(finalized) => {
                        if self.pending_drops.remove(&finalized).is_some() {
                            log::debug!("Version {} finalizes pending drops of {}", version, finalized);
                        }
                    }
                    Err(_) => {
                        log::warn!("Version {} has an empty dropsFor reference", version);
                    }
                }
            }

            self.apply_change_set(change_set)?;
        }
        Ok(())
    }

    fn apply_change_set(&mut self, change_set: &ChangeSet) -> Result<()> {
        for change in change_set.changes() {
            match change {
                Change::CreateTable(change) => self.create_table(change)?,
                Change::DropTable(change) => self.drop_table(change)?,
                Change::AddColumn(change) => self.add_column(change)?,
                Change::AlterColumn(change) => self.alter_column(change)?,
                Change::DropColumn(change) => self.drop_column(change)?,
                Change::CreateIndex(change) => self.create_index(change)?,
                Change::DropIndex(change) => self.drop_index(change)?,
                Change::AddHistoryTable(change) => self.add_history_table(change)?,
                Change::DropHistoryTable(change) => self.drop_history_table(change)?,
            }
        }
        Ok(())
    }

    /// Adjust the FK references on all the draft tables.
    ///
    /// Columns of a draft table that reference a table with a draft
    /// counterpart are pointed at the counterpart instead. Run once after the
    /// whole model is assembled; mid-replay the counterpart may not exist yet.
    pub fn adjust_draft_references(&mut self) {
        let mut adjustments = Vec::new();

        for table in self.tables.values().filter(|table| table.is_draft()) {
            for column in table.columns() {
                let Some((ref_table, ref_column)) =
                    column.references.as_deref().and_then(|r| r.rsplit_once('.'))
                else {
                    continue;
                };

                let Some(target) = self.tables.get(ref_table) else {
                    log::warn!(
                        "Draft table [{}] column [{}] references unknown table [{}]",
                        table.name(),
                        column.name,
                        ref_table
                    );
                    continue;
                };

                if let Some(draft) = self.draft_counterpart(target) {
                    adjustments.push((
                        table.name().to_string(),
                        column.name.clone(),
                        format!("{}.{}", draft, ref_column),
                    ));
                }
            }
        }

        for (table, column, references) in adjustments {
            if let Some(column) = self
                .tables
                .get_mut(&table)
                .and_then(|table| table.column_mut(&column))
            {
                column.references = Some(references);
            }
        }
    }

    /// The draft table paired with `table`: its registered link, else the
    /// draft table named by the configured suffix.
    fn draft_counterpart(&self, table: &Table) -> Option<String> {
        if table.is_draft() {
            return None;
        }
        if let Some(draft_table) = table.draft_table() {
            return Some(draft_table.to_string());
        }
        let name = format!("{}{}", table.name(), self.config.draft_suffix);
        self.tables
            .get(&name)
            .filter(|candidate| candidate.is_draft())
            .map(|_| name)
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| MigrationError::TableNotFound(name.to_string()))
    }

    fn create_table(&mut self, change: &CreateTable) -> Result<()> {
        if self.tables.contains_key(&change.name) {
            return Err(MigrationError::TableAlreadyExists(change.name.clone()));
        }
        self.tables.insert(change.name.clone(), Table::from(change));
        Ok(())
    }

    fn drop_table(&mut self, change: &DropTable) -> Result<()> {
        if self.tables.shift_remove(&change.name).is_none() {
            return Err(MigrationError::TableNotFound(change.name.clone()));
        }
        if self.config.cascade_index_drops {
            self.indexes
                .retain(|_, index| index.table_name() != change.name);
        }
        Ok(())
    }

    fn create_index(&mut self, change: &CreateIndex) -> Result<()> {
        if self.indexes.contains_key(&change.index_name) {
            return Err(MigrationError::IndexAlreadyExists(change.index_name.clone()));
        }
        if !self.tables.contains_key(&change.table_name) {
            return Err(MigrationError::TableNotFound(change.table_name.clone()));
        }
        self.indexes
            .insert(change.index_name.clone(), Index::from(change));
        Ok(())
    }

    fn drop_index(&mut self, change: &DropIndex) -> Result<()> {
        if self.indexes.shift_remove(&change.index_name).is_none() {
            return Err(MigrationError::IndexNotFound(change.index_name.clone()));
        }
        Ok(())
    }

    fn add_column(&mut self, change: &AddColumn) -> Result<()> {
        self.table_mut(&change.table_name)?.apply_add_column(change)
    }

    fn alter_column(&mut self, change: &AlterColumn) -> Result<()> {
        self.table_mut(&change.table_name)?.apply_alter_column(change)
    }

    fn drop_column(&mut self, change: &DropColumn) -> Result<()> {
        self.table_mut(&change.table_name)?.apply_drop_column(change)
    }

    fn add_history_table(&mut self, change: &AddHistoryTable) -> Result<()> {
        self.table_mut(&change.base_table)?.set_with_history(true);
        Ok(())
    }

    fn drop_history_table(&mut self, change: &DropHistoryTable) -> Result<()> {
        self.table_mut(&change.base_table)?.set_with_history(false);
        Ok(())
    }
}
