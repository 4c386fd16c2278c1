//! Line-oriented reading of JSONL audit streams.

use std::io::BufRead;

use crate::error::RecordParseError;
use crate::record::AuditRecord;

/// One non-blank line of an audit stream.
#[derive(Debug)]
pub enum Entry {
    /// The line parsed into a record.
    Record {
        /// 1-based line number.
        line_number: usize,
        /// The parsed record.
        record: AuditRecord,
    },
    /// The line could not be parsed.
    Malformed {
        /// 1-based line number.
        line_number: usize,
        /// Why parsing failed.
        error: RecordParseError,
    },
}

/// Iterator over the non-blank lines of a reader.
///
/// Line numbers count every line, blank ones included. Yields `Err` only for
/// I/O failures of the underlying reader; the caller decides whether to stop.
pub struct EntryReader<R> {
    reader: R,
    line_number: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> EntryReader<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Line number of the last line read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for EntryReader<R> {
    type Item = std::io::Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err(e)),
            }

            let line_number = self.line_number;
            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(_) => {
                    return Some(Ok(Entry::Malformed {
                        line_number,
                        error: RecordParseError::Encoding,
                    }))
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            return Some(Ok(match AuditRecord::parse(line) {
                Ok(record) => Entry::Record {
                    line_number,
                    record,
                },
                Err(error) => Entry::Malformed { line_number, error },
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_but_counts_them() {
        let input = "{\"primitive\":\"a\"}\n\n   \n{bad\n{\"primitive\":\"b\"}";
        let entries: Vec<Entry> = EntryReader::new(input.as_bytes())
            .filter_map(Result::ok)
            .collect();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], Entry::Record { line_number: 1, .. }));
        assert!(matches!(
            entries[1],
            Entry::Malformed {
                line_number: 4,
                error: RecordParseError::Json(_)
            }
        ));
        assert!(matches!(entries[2], Entry::Record { line_number: 5, ref record } if record.primitive.as_deref() == Some("b")));
    }

    #[test]
    fn invalid_utf8_is_malformed_and_reading_continues() {
        let mut input = b"{\"primitive\":\"a\"}\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"{\"primitive\":\"c\"}\r\n");
        let entries: Vec<Entry> = EntryReader::new(input.as_slice())
            .filter_map(Result::ok)
            .collect();
        assert_eq!(entries.len(), 3);
        assert!(matches!(
            entries[1],
            Entry::Malformed {
                line_number: 2,
                error: RecordParseError::Encoding
            }
        ));
        assert!(matches!(entries[2], Entry::Record { line_number: 3, .. }));
    }
}
