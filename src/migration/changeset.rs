//! Changeset documents: the ordered schema changes of one migration version
//!
//! These types are what an external loader produces. They derive serde with
//! camelCase field names; [`Change`] is tagged by a `kind` field.

use crate::model::Column;
use serde::{Deserialize, Serialize};

/// Default value marker meaning "drop the column default".
pub const DROP_DEFAULT: &str = "DB_NULL";

/// One migration version: an ordered sequence of changesets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Migration {
    #[serde(default)]
    pub change_sets: Vec<ChangeSet>,
}

impl Migration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a changeset, builder style
    #[must_use]
    pub fn with_change_set(mut self, change_set: ChangeSet) -> Self {
        self.change_sets.push(change_set);
        self
    }

    #[must_use]
    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.change_sets
    }
}

/// How a changeset is treated when applied to the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeSetType {
    /// Ordinary changes applied directly
    #[default]
    Apply,

    /// Changes establishing a baseline; applied like `Apply`
    Baseline,

    /// Destructive changes deferred until a later version finalizes them
    PendingDrops,
}

/// An atomic, ordered group of changes within a migration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(rename = "type", default)]
    pub change_set_type: ChangeSetType,

    /// The earlier version whose pending drops this changeset finalizes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drops_for: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default)]
    pub changes: Vec<Change>,
}

impl ChangeSet {
    /// An ordinary changeset
    pub fn apply(changes: impl IntoIterator<Item = Change>) -> Self {
        Self {
            change_set_type: ChangeSetType::Apply,
            changes: changes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A deferral container whose changes are recorded but not applied
    pub fn pending_drops(changes: impl IntoIterator<Item = Change>) -> Self {
        Self {
            change_set_type: ChangeSetType::PendingDrops,
            changes: changes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// An ordinary changeset that finalizes the pending drops of `version`
    pub fn drops_for(version: impl Into<String>, changes: impl IntoIterator<Item = Change>) -> Self {
        Self {
            change_set_type: ChangeSetType::Apply,
            drops_for: Some(version.into()),
            changes: changes.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_pending_drops(&self) -> bool {
        self.change_set_type == ChangeSetType::PendingDrops
    }

    /// The version this changeset finalizes, if any
    #[must_use]
    pub fn finalizes(&self) -> Option<&str> {
        self.drops_for.as_deref()
    }

    pub fn changes(&self) -> impl Iterator<Item = &Change> + '_ {
        self.changes.iter()
    }
}

/// A single schema change operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Change {
    CreateTable(CreateTable),
    DropTable(DropTable),
    AddColumn(AddColumn),
    AlterColumn(AlterColumn),
    DropColumn(DropColumn),
    CreateIndex(CreateIndex),
    DropIndex(DropIndex),
    AddHistoryTable(AddHistoryTable),
    DropHistoryTable(DropHistoryTable),
}

macro_rules! impl_into_change {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Change {
                fn from(change: $ty) -> Self {
                    Change::$ty(change)
                }
            }
        )*
    };
}

impl_into_change!(
    CreateTable,
    DropTable,
    AddColumn,
    AlterColumn,
    DropColumn,
    CreateIndex,
    DropIndex,
    AddHistoryTable,
    DropHistoryTable,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTable {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk_name: Option<String>,

    #[serde(default)]
    pub with_history: bool,

    /// True when this is the draft variant of another table
    #[serde(default)]
    pub draft: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default)]
    pub columns: Vec<Column>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTable {
    pub name: String,
}

impl DropTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddColumn {
    pub table_name: String,

    /// Whether the table keeps a history table. Informational only; the
    /// table's history flag changes through AddHistoryTable/DropHistoryTable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_history: Option<bool>,

    pub columns: Vec<Column>,
}

impl AddColumn {
    pub fn new(table_name: impl Into<String>, column: Column) -> Self {
        Self {
            table_name: table_name.into(),
            with_history: None,
            columns: vec![column],
        }
    }
}

/// Partial update of an existing column. `None` leaves an attribute as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlterColumn {
    pub table_name: String,
    pub column_name: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,

    /// New default; [`DROP_DEFAULT`] removes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_null: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_unique: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_constraint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_check_constraint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key_index: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_foreign_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_exclude: Option<bool>,
}

impl AlterColumn {
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropColumn {
    pub table_name: String,
    pub column_name: String,

    /// Set when the owning table keeps a history table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_history: Option<bool>,
}

impl DropColumn {
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            with_history: None,
        }
    }

    #[must_use]
    pub fn is_with_history(&self) -> bool {
        self.with_history == Some(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndex {
    pub index_name: String,
    pub table_name: String,
    pub columns: Vec<String>,
}

impl CreateIndex {
    pub fn new<I, S>(index_name: impl Into<String>, table_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_name: index_name.into(),
            table_name: table_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropIndex {
    pub index_name: String,

    #[serde(default)]
    pub table_name: String,
}

impl DropIndex {
    pub fn new(index_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            table_name: table_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHistoryTable {
    pub base_table: String,
}

impl AddHistoryTable {
    pub fn new(base_table: impl Into<String>) -> Self {
        Self {
            base_table: base_table.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropHistoryTable {
    pub base_table: String,
}

impl DropHistoryTable {
    pub fn new(base_table: impl Into<String>) -> Self {
        Self {
            base_table: base_table.into(),
        }
    }
}
