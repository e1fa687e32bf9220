//! Domain models for the `MeSH` vocabulary.
//!
//! This module contains the descriptor [`Record`], the [`RecordsIndex`] from
//! tree numbers to records, the tree-number prefix tree and the parser
//! configuration.

/// Descriptor records and the tree-number index.
pub mod record;
pub use record::{Record, RecordsIndex, normalize_entry};

mod config;
pub use config::{Config, ConfigError};

/// The tree-number prefix tree.
pub mod tree;
pub use tree::{Node, PATH_SEPARATOR};
