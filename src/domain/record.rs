//! Descriptor records and the tree-number index built while parsing them.

use std::{
    collections::{BTreeSet, HashMap, hash_map},
    sync::Arc,
};

use serde::Serialize;

/// Field carrying the unique descriptor identifier.
pub const FIELD_UI: &str = "UI";
/// Field carrying the preferred heading.
pub const FIELD_MH: &str = "MH";
/// Field carrying a tree number. May repeat.
pub const FIELD_MN: &str = "MN";
/// Field carrying the scope note.
pub const FIELD_MS: &str = "MS";
/// Field carrying a synonym. May repeat.
pub const FIELD_ENTRY: &str = "ENTRY";
/// Field carrying a synonym flagged for print. May repeat.
pub const FIELD_PRINT_ENTRY: &str = "PRINT ENTRY";

/// A single descriptor from a `MeSH` record file.
///
/// Records are built field by field by the
/// [`FieldAccumulator`](crate::reader::FieldAccumulator) and are immutable
/// once finalized. Finalized records are handed out as `Arc<Record>` so that
/// the output sequence and every [`RecordsIndex`] entry share one allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Unique identifier (`UI`), e.g. `D000001`.
    pub id: String,
    /// Preferred heading (`MH`).
    pub heading: String,
    /// Tree numbers (`MN`) in the order they were declared.
    pub tree_numbers: Vec<String>,
    /// Scope note (`MS`).
    pub scope_note: String,
    /// Normalized synonyms taken from `ENTRY` and `PRINT ENTRY` fields.
    pub entries: BTreeSet<String>,
}

impl Record {
    /// Applies a committed field value to the record.
    ///
    /// Unknown field names are ignored.
    pub fn apply_field(&mut self, name: &str, value: &str) {
        match name {
            FIELD_UI => value.clone_into(&mut self.id),
            FIELD_MH => value.clone_into(&mut self.heading),
            FIELD_MS => value.clone_into(&mut self.scope_note),
            FIELD_MN => self.tree_numbers.push(value.to_owned()),
            FIELD_ENTRY | FIELD_PRINT_ENTRY => {
                self.entries.insert(normalize_entry(value));
            }
            _ => {}
        }
    }
}

/// Extracts the synonym term from an entry value.
///
/// Entry values look like `Term|qualifier|...`; only the term is kept.
/// Inverted terms (`Smith, John`) are turned around at the first `", "`
/// (`John Smith`) and double quotes are removed.
#[must_use]
pub fn normalize_entry(value: &str) -> String {
    let term = value.split_once('|').map_or(value, |(term, _)| term);

    let term = match term.split_once(", ") {
        Some((last, first)) => format!("{first} {last}"),
        None => term.to_owned(),
    };

    term.replace('"', "")
}

/// An index from tree number to the record that declared it.
///
/// Every tree number of every finalized record is a key. When two records
/// declare the same tree number the later one replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct RecordsIndex {
    by_tree_number: HashMap<String, Arc<Record>>,
}

impl RecordsIndex {
    /// Creates an empty index with room for `capacity` tree numbers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_tree_number: HashMap::with_capacity(capacity),
        }
    }

    /// Registers every tree number of `record`.
    pub(crate) fn register(&mut self, record: &Arc<Record>) {
        for tree_number in &record.tree_numbers {
            if let Some(previous) = self
                .by_tree_number
                .insert(tree_number.clone(), Arc::clone(record))
            {
                if !Arc::ptr_eq(&previous, record) {
                    tracing::debug!(
                        tree_number = tree_number.as_str(),
                        previous = previous.id.as_str(),
                        replacement = record.id.as_str(),
                        "tree number declared by more than one record"
                    );
                }
            }
        }
    }

    /// Looks up the record that declared `tree_number`.
    #[must_use]
    pub fn get(&self, tree_number: &str) -> Option<&Arc<Record>> {
        self.by_tree_number.get(tree_number)
    }

    /// Returns `true` if some record declared `tree_number`.
    #[must_use]
    pub fn contains(&self, tree_number: &str) -> bool {
        self.by_tree_number.contains_key(tree_number)
    }

    /// The number of distinct tree numbers in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tree_number.len()
    }

    /// Returns `true` if the index holds no tree numbers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tree_number.is_empty()
    }

    /// Iterates over `(tree number, record)` pairs in arbitrary order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.by_tree_number.iter(),
        }
    }
}

/// Iterator over the entries of a [`RecordsIndex`].
#[derive(Debug)]
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, Arc<Record>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Arc<Record>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(tree_number, record)| (tree_number.as_str(), record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a RecordsIndex {
    type Item = (&'a str, &'a Arc<Record>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
