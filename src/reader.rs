//! Parsers for the `MeSH` distribution formats.
//!
//! Both parsers consume any [`std::io::BufRead`] line source and never open
//! files themselves.
//!
//! - [`RecordParser`] reads the descriptor record format (`*NEWRECORD` /
//!   `FIELD = value` lines) on a background worker and streams finished
//!   [`Record`](crate::Record)s to the caller.
//! - [`TreeParser`] reads the `label;tree.number` listing into a
//!   [`Node`](crate::Node) tree, synchronously.

use std::{
    borrow::Cow,
    io::{self, BufRead},
};

mod accumulator;
mod stream;
mod tree_listing;

pub use accumulator::{COMMENT_MARKER, FIELD_SEPARATOR, FieldAccumulator, RECORD_SENTINEL};
pub use stream::{CancellationToken, RecordParser, RecordStream};
pub use tree_listing::{TreeListingSummary, TreeParser};

/// Errors that end a parse.
///
/// Malformed lines are never errors; they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Reading from the line source failed.
    ///
    /// Nothing after the failing line is parsed and the record that was
    /// open at the time is discarded.
    #[error("failed to read line {line}")]
    Io {
        /// The line that could not be read (1-based).
        line: usize,
        /// The underlying read error.
        source: io::Error,
    },

    /// The consumer stopped the parse before the input was exhausted.
    #[error("parsing was cancelled after line {line}")]
    Cancelled {
        /// The last line read before the parse stopped.
        line: usize,
    },

    /// The background worker could not be started.
    #[error("failed to spawn the record parser worker")]
    Spawn(#[source] io::Error),

    /// The background worker panicked.
    #[error("the record parser worker panicked")]
    WorkerPanicked,
}

/// Reads the next line into `buf` and decodes it.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD and a warning is
/// logged. `line` is the 1-based number of the line being read and is
/// used for the warning and for [`ParseError::Io`]. Returns `None` at end of
/// input.
fn next_line<'a, R: BufRead>(
    reader: &mut R,
    buf: &'a mut Vec<u8>,
    line: usize,
) -> Result<Option<Cow<'a, str>>, ParseError> {
    buf.clear();
    let read = reader
        .read_until(b'\n', buf)
        .map_err(|source| ParseError::Io { line, source })?;
    if read == 0 {
        return Ok(None);
    }

    let text = String::from_utf8_lossy(buf);
    if matches!(text, Cow::Owned(_)) {
        tracing::warn!(line, "line is not valid UTF-8, invalid bytes replaced");
    }
    Ok(Some(text))
}

/// Strips a trailing `\n` or `\r\n` from a line read with `read_line`.
fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("UI = D1\n", "UI = D1"; "unix")]
    #[test_case("UI = D1\r\n", "UI = D1"; "windows")]
    #[test_case("UI = D1", "UI = D1"; "no terminator")]
    #[test_case("\n", ""; "blank")]
    #[test_case("MS = a\r", "MS = a"; "lone carriage return")]
    fn line_endings(raw: &str, expected: &str) {
        assert_eq!(trim_line_ending(raw), expected);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut reader = io::Cursor::new(&b"MS = caf\xE9\r\nUI = D1"[..]);
        let mut buf = Vec::new();

        let first = next_line(&mut reader, &mut buf, 1).unwrap().unwrap();
        assert_eq!(trim_line_ending(&first), "MS = caf\u{FFFD}");
        drop(first);

        let second = next_line(&mut reader, &mut buf, 2).unwrap().unwrap();
        assert!(matches!(second, Cow::Borrowed("UI = D1")));
        drop(second);

        assert!(next_line(&mut reader, &mut buf, 3).unwrap().is_none());
    }
}
