//! `MeSH` vocabulary records and tree numbers
//!
//! Descriptor records are parsed from the flat `*NEWRECORD` format into
//! [`Record`]s and a [`RecordsIndex`] keyed by tree number. Tree listings are
//! parsed into a [`Node`] prefix tree that answers descendant queries.

pub mod domain;
pub use domain::{Config, Node, Record, RecordsIndex};

/// Parsers for the record and tree listing formats.
pub mod reader;
pub use reader::{ParseError, RecordParser, RecordStream, TreeParser};
