use crate::migration::{AlterColumn, DROP_DEFAULT};
use serde::{Deserialize, Serialize};

/// A column of a [`super::Table`].
///
/// Attributes are carried from the changeset payload as-is; the model only
/// copies and overwrites them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,

    /// Logical column type, e.g. `varchar(255)`
    #[serde(rename = "type")]
    pub column_type: String,

    #[serde(default)]
    pub not_null: bool,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub identity: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Name of the unique constraint on this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_constraint: Option<String>,

    /// Foreign key target in `table.column` form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_index: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Excluded from the history table
    #[serde(default)]
    pub history_exclude: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn references(mut self, references: impl Into<String>) -> Self {
        self.references = Some(references.into());
        self
    }

    /// The table part of `references`, if this column is a foreign key
    #[must_use]
    pub fn referenced_table(&self) -> Option<&str> {
        self.references
            .as_deref()
            .and_then(|r| r.rsplit_once('.'))
            .map(|(table, _)| table)
    }

    /// Overwrite the attributes present in `alter`, leaving the rest untouched.
    pub fn apply(&mut self, alter: &AlterColumn) {
        if let Some(column_type) = &alter.column_type {
            self.column_type.clone_from(column_type);
        }
        if let Some(default_value) = &alter.default_value {
            self.default_value = if default_value == DROP_DEFAULT {
                None
            } else {
                Some(default_value.clone())
            };
        }
        if let Some(not_null) = alter.not_null {
            self.not_null = not_null;
        }
        if alter.drop_unique.is_some() {
            self.unique = None;
        }
        if let Some(unique) = &alter.unique {
            self.unique = Some(unique.clone());
        }
        if alter.drop_check_constraint.is_some() {
            self.check_constraint = None;
        }
        if let Some(check) = &alter.check_constraint {
            self.check_constraint = Some(check.clone());
        }
        if alter.drop_foreign_key.is_some() {
            self.references = None;
            self.foreign_key_name = None;
            self.foreign_key_index = None;
        }
        if let Some(references) = &alter.references {
            self.references = Some(references.clone());
            self.foreign_key_name.clone_from(&alter.foreign_key_name);
            self.foreign_key_index.clone_from(&alter.foreign_key_index);
        }
        if let Some(comment) = &alter.comment {
            // empty comment removes it
            self.comment = (!comment.is_empty()).then(|| comment.clone());
        }
        if let Some(history_exclude) = alter.history_exclude {
            self.history_exclude = history_exclude;
        }
    }
}
