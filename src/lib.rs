//! # Tidemark
//!
//! Logical model of a relational schema, evolved by replaying versioned
//! migration changesets. The model tracks tables, columns and indexes as they
//! stand after each version, together with the destructive changes that have
//! been deferred (pending drops) until history tables no longer need them.
//!
//! Loading changeset documents, generating DDL and introspecting a live
//! database are left to callers; see [`migration`] for the document types and
//! [`model`] for the model itself.

pub mod config;
pub mod migration;
pub mod model;

pub use config::ModelConfig;
pub use migration::{MigrationError, MigrationVersion, Replay};
pub use model::Model;
