//! Artalk Community Core - types and checks for the plugin and theme registry
//!
//! This crate provides the pieces that never touch the network:
//! - `LocalEntry`: a hand-authored plugin or theme declaration
//! - `RegistryEntry` / `RegistryData`: the published catalog (`registry.json`)
//! - `store`: reading the declarative YAML lists
//! - `validate`: required-field and formatting checks over raw entries
//! - `RegistryPaths`: where the lists and the catalog live

pub mod entry;
pub mod error;
pub mod paths;
pub mod store;
pub mod validate;

pub use entry::{
    EntryKind, LocalEntry, REQUIRED_FIELDS, RegistryData, RegistryEntry, VERIFIED_SCOPE,
};
pub use error::{CoreError, Result};
pub use paths::RegistryPaths;
pub use store::{PositionedEntry, RawEntry, SourcePos, read_entries, read_positioned};
pub use validate::{EntryReport, FileReport, InvalidField, validate_entry, validate_file};
