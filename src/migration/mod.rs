//! Migration documents and their application
//!
//! This module provides:
//! - Changeset document types supplied by an external loader
//! - Version parsing and ordering
//! - Migration checksums for drift detection
//! - Ordered replay of migrations onto a [`crate::Model`]
//!
//! # Example
//!
//! ```rust
//! use tidemark::migration::{ChangeSet, CreateTable, Migration, MigrationVersion, Replay};
//! use tidemark::model::{Column, Model};
//!
//! let mut replay = Replay::new(Model::new());
//! let migration = Migration::new().with_change_set(ChangeSet::apply([
//!     CreateTable::new("customer", [Column::new("id", "bigint").primary_key()]).into(),
//! ]));
//! replay.apply(MigrationVersion::parse("1.0")?, &migration)?;
//!
//! let model = replay.finish();
//! assert!(model.get_table("customer").is_some());
//! # Ok::<(), tidemark::migration::MigrationError>(())
//! ```

pub mod changeset;
pub mod checksum;
pub mod error;
pub mod replay;
pub mod version;

pub use changeset::{
    AddColumn, AddHistoryTable, AlterColumn, Change, ChangeSet, ChangeSetType, CreateIndex,
    CreateTable, DropColumn, DropHistoryTable, DropIndex, DropTable, Migration, DROP_DEFAULT,
};
pub use checksum::{calculate_checksum, validate_checksum};
pub use error::{MigrationError, Result};
pub use replay::Replay;
pub use version::MigrationVersion;
