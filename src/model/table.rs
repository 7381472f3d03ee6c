use super::Column;
use crate::migration::{AddColumn, AlterColumn, CreateTable, DropColumn, MigrationError, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A table in the model
///
/// Columns are kept in insertion order, which is the physical column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pk_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,

    columns: IndexMap<String, Column>,

    /// True once a history table is enabled for this table
    #[serde(default)]
    with_history: bool,

    /// True if this is the draft variant of another table
    #[serde(default)]
    draft: bool,

    /// Name of this table's draft counterpart, when registered explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    draft_table: Option<String>,

    /// Columns whose drop is recorded but not yet finalized
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pending_drop_columns: IndexSet<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pk_name(&self) -> Option<&str> {
        self.pk_name.as_deref()
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Columns in physical order
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.columns.values()
    }

    pub fn column_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.values().filter(|column| column.primary_key)
    }

    /// Add or replace a column without validation.
    ///
    /// Used when seeding a model from introspected metadata.
    pub fn add_column(&mut self, column: Column) -> Option<Column> {
        self.columns.insert(column.name.clone(), column)
    }

    #[must_use]
    pub fn with_history(&self) -> bool {
        self.with_history
    }

    pub fn set_with_history(&mut self, with_history: bool) {
        self.with_history = with_history;
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.draft
    }

    pub fn set_draft(&mut self, draft: bool) {
        self.draft = draft;
    }

    #[must_use]
    pub fn draft_table(&self) -> Option<&str> {
        self.draft_table.as_deref()
    }

    /// Link this table to its draft counterpart
    pub fn set_draft_table(&mut self, draft_table: impl Into<String>) {
        self.draft_table = Some(draft_table.into());
    }

    pub fn pending_drop_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.pending_drop_columns.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_pending_drop_column(&self, column: &str) -> bool {
        self.pending_drop_columns.contains(column)
    }

    /// Record that `column` is slated for removal without removing it.
    ///
    /// Returns false if it was already registered.
    pub fn register_pending_drop_column(&mut self, column: impl Into<String>) -> bool {
        self.pending_drop_columns.insert(column.into())
    }

    /// Add the columns of an AddColumn change.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::ColumnAlreadyExists` for the first column
    /// already present on the table.
    pub fn apply_add_column(&mut self, change: &AddColumn) -> Result<()> {
        for column in &change.columns {
            if self.columns.contains_key(&column.name) {
                return Err(MigrationError::ColumnAlreadyExists {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
            self.columns.insert(column.name.clone(), column.clone());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `MigrationError::ColumnNotFound` if the column is absent.
    pub fn apply_alter_column(&mut self, change: &AlterColumn) -> Result<()> {
        let Some(column) = self.columns.get_mut(&change.column_name) else {
            return Err(MigrationError::ColumnNotFound {
                table: self.name.clone(),
                column: change.column_name.clone(),
            });
        };
        column.apply(change);
        Ok(())
    }

    /// Remove a column, keeping the remaining columns in order.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::ColumnNotFound` if the column is absent.
    pub fn apply_drop_column(&mut self, change: &DropColumn) -> Result<()> {
        if self.columns.shift_remove(&change.column_name).is_none() {
            return Err(MigrationError::ColumnNotFound {
                table: self.name.clone(),
                column: change.column_name.clone(),
            });
        }
        self.pending_drop_columns.shift_remove(&change.column_name);
        Ok(())
    }
}

impl From<&CreateTable> for Table {
    fn from(change: &CreateTable) -> Self {
        Self {
            name: change.name.clone(),
            pk_name: change.pk_name.clone(),
            comment: change.comment.clone(),
            columns: change
                .columns
                .iter()
                .map(|column| (column.name.clone(), column.clone()))
                .collect(),
            with_history: change.with_history,
            draft: change.draft,
            draft_table: None,
            pending_drop_columns: IndexSet::new(),
        }
    }
}
