//! Synchronous loading of the `label;tree.number` listing.

use std::io::BufRead;

use tracing::instrument;

use super::{ParseError, next_line, trim_line_ending};
use crate::domain::{Node, PATH_SEPARATOR};

/// Column separator of the tree listing.
const COLUMN_SEPARATOR: char = ';';

/// Reads a `MeSH` tree listing into a [`Node`] tree.
///
/// Each line of the listing looks like `Body Regions;A01`. The tree number
/// in the second column is split on `.` and inserted into the tree. Empty
/// lines are skipped quietly; any other line without a tree number is logged
/// and skipped.
#[derive(Debug)]
pub struct TreeParser<R> {
    reader: R,
}

/// Counts gathered while populating a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeListingSummary {
    /// Lines read, including blank and skipped lines.
    pub lines: usize,
    /// Tree numbers inserted, including ones already present.
    pub paths: usize,
    /// Lines skipped because they were malformed or held only whitespace.
    pub skipped: usize,
}

impl<R: BufRead> TreeParser<R> {
    /// Creates a parser over `reader`.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Inserts every tree number of the listing into `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if reading fails. Tree numbers inserted
    /// before the failure stay in `root`.
    #[instrument(level = "debug", skip_all)]
    pub fn populate(mut self, root: &mut Node) -> Result<TreeListingSummary, ParseError> {
        let mut summary = TreeListingSummary::default();
        let mut buf = Vec::new();

        while let Some(line) = next_line(&mut self.reader, &mut buf, summary.lines + 1)? {
            summary.lines += 1;

            let content = trim_line_ending(&line);
            if content.is_empty() {
                continue;
            }
            if content.trim().is_empty() {
                tracing::warn!(line = summary.lines, "tree listing line is only whitespace");
                summary.skipped += 1;
                continue;
            }

            let Some(tree_number) = content.split(COLUMN_SEPARATOR).nth(1) else {
                tracing::warn!(line = summary.lines, "tree listing line has no tree number column");
                summary.skipped += 1;
                continue;
            };

            let tree_number = tree_number.trim_matches([' ', '\r', '\n']);
            if tree_number.is_empty() {
                tracing::warn!(line = summary.lines, "tree listing line has an empty tree number");
                summary.skipped += 1;
                continue;
            }

            root.insert(tree_number.split(PATH_SEPARATOR));
            summary.paths += 1;
        }

        tracing::debug!(
            lines = summary.lines,
            paths = summary.paths,
            skipped = summary.skipped,
            nodes = root.node_count(),
            "tree listing loaded"
        );
        Ok(summary)
    }
}
