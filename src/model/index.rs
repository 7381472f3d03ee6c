use crate::migration::CreateIndex;
use serde::{Deserialize, Serialize};

/// A non-unique, non-foreign-key index.
///
/// Indexes are never altered in place; a change is a drop followed by a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    /// Index name is unique within the model
    name: String,

    /// The table being indexed
    table_name: String,

    /// Indexed columns, in index order
    columns: Vec<String>,
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, table_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl From<&CreateIndex> for Index {
    fn from(change: &CreateIndex) -> Self {
        Self::new(&change.index_name, &change.table_name, &change.columns)
    }
}
