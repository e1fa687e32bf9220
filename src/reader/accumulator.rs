//! The line-driven state machine behind the record parser.

use crate::domain::Record;

/// The line that opens a new record.
pub const RECORD_SENTINEL: &str = "*NEWRECORD";

/// Lines starting with this character are comments.
pub const COMMENT_MARKER: char = '!';

/// Separates a field name from its value on a field line.
pub const FIELD_SEPARATOR: &str = " = ";

/// Accumulates the lines of a descriptor file into [`Record`]s.
///
/// Lines are fed one at a time with [`push_line`](Self::push_line). Field
/// values may span several physical lines; a value is only committed to the
/// record once the next field, the next record or the end of input shows that
/// it is complete.
///
/// Lines before the first [`RECORD_SENTINEL`] are ignored.
#[derive(Debug, Default)]
pub struct FieldAccumulator {
    /// The record being built. `None` until the first sentinel.
    record: Option<Record>,
    /// Name of the field whose value is buffered.
    field: Option<String>,
    buffer: String,
    line_number: usize,
}

impl FieldAccumulator {
    /// Creates an accumulator awaiting its first record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a sentinel has been seen.
    #[must_use]
    pub const fn is_within_record(&self) -> bool {
        self.record.is_some()
    }

    /// The number of lines fed so far.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Feeds one line, without its line terminator.
    ///
    /// Returns the previous record when `line` is a sentinel that closes it.
    pub fn push_line(&mut self, line: &str) -> Option<Record> {
        self.line_number += 1;

        if line == RECORD_SENTINEL {
            let finished = self.take_record();
            self.record = Some(Record::default());
            return finished;
        }

        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            return None;
        }

        let record = self.record.as_mut()?;

        match line.split_once(FIELD_SEPARATOR) {
            Some((name, value)) => {
                if !self.buffer.is_empty() {
                    if let Some(field) = &self.field {
                        record.apply_field(field, &self.buffer);
                    }
                    self.buffer.clear();
                }
                self.buffer.push_str(value.trim());
                self.field = Some(name.trim_matches(' ').to_owned());
            }
            None if self.field.is_none() => {
                tracing::warn!(
                    line = self.line_number,
                    "expected a `FIELD = value` line, ignoring"
                );
            }
            None => self.buffer.push_str(line.trim()),
        }

        None
    }

    /// Signals the end of input.
    ///
    /// Commits the buffered field and returns the open record, if any.
    pub fn finish(&mut self) -> Option<Record> {
        self.take_record()
    }

    fn take_record(&mut self) -> Option<Record> {
        let field = self.field.take();
        let mut record = self.record.take();

        if let (Some(record), Some(field)) = (record.as_mut(), field) {
            if !self.buffer.is_empty() {
                record.apply_field(&field, &self.buffer);
            }
        }
        self.buffer.clear();

        record
    }
}
