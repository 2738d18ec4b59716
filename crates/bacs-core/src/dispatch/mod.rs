//! Stream dispatcher: classifies physical lines against a group schema.
//!
//! [`StreamReader`] is the line-based implementation of [`RecordReader`].
//! It consumes every line exactly once, finds the record schema accepting it
//! at the current grammar position, enforces occurrence bounds and extracts
//! the record's field values.

mod cursor;

use std::io::{self, BufRead};

use tracing::debug;

use crate::error::{BacsError, Result};
use crate::models::row::RowKind;
use crate::schema::{FieldValues, GroupSchema};
use cursor::{GroupCursor, Step, too_many};

/// A source of classified, extracted records.
pub trait RecordReader {
    /// Advance to the next record. Returns `false` once input is exhausted.
    fn read(&mut self) -> Result<bool>;

    /// Kind of the current record.
    fn record_kind(&self) -> Option<RowKind>;

    /// Name of the current record.
    fn record_name(&self) -> Option<&str> {
        self.record_kind().map(RowKind::name)
    }

    /// 1-based number of the line holding the current record.
    fn line_number(&self) -> usize;

    /// Field values of the current record.
    fn values(&self) -> Option<&FieldValues>;

    /// Release the underlying input. Calling it again has no effect.
    fn close(&mut self);
}

/// Reads records line by line from any buffered input.
pub struct StreamReader<R> {
    schema: GroupSchema,
    input: Option<io::Lines<R>>,
    cursor: GroupCursor,
    line_no: usize,
    current: Option<(RowKind, FieldValues)>,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(schema: GroupSchema, input: R) -> Self {
        let cursor = GroupCursor::new(&schema);
        Self {
            schema,
            input: Some(input.lines()),
            cursor,
            line_no: 0,
            current: None,
        }
    }

    /// Whether the input has been released.
    pub fn is_closed(&self) -> bool {
        self.input.is_none()
    }

    fn next_record(&mut self) -> Result<bool> {
        let Some(lines) = self.input.as_mut() else {
            return Ok(false);
        };

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                self.cursor.check_complete(&self.schema, None)?;
                self.close();
                return Ok(false);
            }
        };
        self.line_no += 1;

        let record = match self.cursor.step(&self.schema, &line, self.line_no)? {
            Step::Matched(record) => record,
            Step::Exhausted { name, max } => return Err(too_many(self.line_no, name, max)),
            Step::NoMatch => {
                return Err(BacsError::Classification {
                    line: self.line_no,
                    content: line,
                });
            }
        };

        let values = record.extract(&line).map_err(|err| BacsError::Format {
            line: self.line_no,
            record: record.name().to_string(),
            field: err.field,
            source: err.source,
        })?;

        debug!(line = self.line_no, record = record.name(), fields = values.len(), "classified");
        self.current = Some((record.kind, values));
        Ok(true)
    }
}

impl<R: BufRead> RecordReader for StreamReader<R> {
    fn read(&mut self) -> Result<bool> {
        self.current = None;
        let result = self.next_record();
        if result.is_err() {
            self.close();
        }
        result
    }

    fn record_kind(&self) -> Option<RowKind> {
        self.current.as_ref().map(|(kind, _)| *kind)
    }

    fn line_number(&self) -> usize {
        self.line_no
    }

    fn values(&self) -> Option<&FieldValues> {
        self.current.as_ref().map(|(_, values)| values)
    }

    fn close(&mut self) {
        if self.input.take().is_some() {
            debug!(lines = self.line_no, "input closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, StructureViolation};
    use crate::standard18;

    fn pad(text: &str, width: usize) -> String {
        format!("{text:<width$}")
    }

    fn reader(lines: &[String]) -> StreamReader<io::Cursor<String>> {
        StreamReader::new(standard18::schema(), io::Cursor::new(lines.join("\n")))
    }

    fn batch_head() -> Vec<String> {
        vec![pad("HDR1", 80), pad("HDR2", 80), pad("UHL1 24001", 80)]
    }

    fn place(line: &mut String, offset: usize, text: &str) {
        line.replace_range(offset..offset + text.len(), text);
    }

    fn payment(prefix: &str) -> String {
        let mut line = pad("", 100);
        place(&mut line, 0, prefix);
        place(&mut line, 6, "12345678");
        place(&mut line, 14, "0");
        place(&mut line, 15, "17");
        place(&mut line, 17, "876543");
        place(&mut line, 23, "21000000");
        place(&mut line, 35, "00000012345");
        line
    }

    fn contra() -> String {
        let mut line = payment("123456");
        place(&mut line, 64, "CONTRA");
        line
    }

    fn instruction(prefix: &str) -> String {
        payment(prefix)
    }

    #[test]
    fn test_contra_wins_over_instruction() {
        let mut lines = batch_head();
        lines.push(contra());
        let mut reader = reader(&lines);
        for _ in 0..3 {
            assert!(reader.read().unwrap());
        }
        assert!(reader.read().unwrap());
        assert_eq!(reader.record_kind(), Some(RowKind::Contra));
        assert_eq!(reader.record_name(), Some("CONTRA"));
        assert_eq!(reader.line_number(), 4);
    }

    #[test]
    fn test_digit_prefix_is_instruction() {
        let mut lines = batch_head();
        lines.push(instruction("123456"));
        let mut reader = reader(&lines);
        for _ in 0..4 {
            assert!(reader.read().unwrap());
        }
        assert_eq!(reader.record_kind(), Some(RowKind::Instr));
        let values = reader.values().unwrap();
        let destination = values.required_segment("destination").unwrap();
        assert_eq!(destination.text("sortCode").unwrap(), "123456");
    }

    #[test]
    fn test_non_digit_prefix_is_rejected() {
        let mut lines = batch_head();
        lines.push(instruction("AB3456"));
        let mut reader = reader(&lines);
        for _ in 0..3 {
            reader.read().unwrap();
        }
        let err = reader.read().unwrap_err();
        assert!(matches!(err, BacsError::Classification { line: 4, .. }));
        assert!(reader.is_closed());
    }

    #[test]
    fn test_length_outside_bounds_is_rejected() {
        for line in [pad("VOL1", 79), pad("VOL1", 81), pad(&contra(), 107)] {
            let mut reader = reader(&[line]);
            let err = reader.read().unwrap_err();
            assert!(matches!(err, BacsError::Classification { line: 1, .. }), "{err}");
        }
    }

    #[test]
    fn test_bad_julian_date_is_format_error() {
        let mut lines = batch_head();
        lines[2] = pad("UHL1 24400", 80);
        let mut reader = reader(&lines);
        reader.read().unwrap();
        reader.read().unwrap();
        let err = reader.read().unwrap_err();
        match err {
            BacsError::Format { line, record, field, source } => {
                assert_eq!(line, 3);
                assert_eq!(record, "UHL1");
                assert_eq!(field, "processingDate");
                assert_eq!(source, CodecError::DayOutOfRange { year: 2024, day: 400 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_end_of_input_inside_batch() {
        let mut reader = reader(&batch_head());
        for _ in 0..3 {
            assert!(reader.read().unwrap());
        }
        let err = reader.read().unwrap_err();
        assert!(matches!(
            err,
            BacsError::Structure {
                line: None,
                violation: StructureViolation::Missing { ref name, .. }
            } if name == "EOF1"
        ));
        assert!(reader.is_closed());
    }

    #[test]
    fn test_payment_after_closing_header_is_rejected() {
        let mut lines = batch_head();
        lines.push(pad("EOF1", 80));
        lines.push(contra());
        let mut reader = reader(&lines);
        for _ in 0..4 {
            assert!(reader.read().unwrap());
        }
        let err = reader.read().unwrap_err();
        assert!(matches!(err, BacsError::Classification { line: 5, .. }), "{err}");
        assert!(reader.is_closed());
    }

    #[test]
    fn test_empty_input_is_valid() {
        let mut reader = reader(&[]);
        assert!(!reader.read().unwrap());
        assert!(reader.is_closed());
        assert!(!reader.read().unwrap());
    }

    #[test]
    fn test_structure_error_closes_reader() {
        let lines = vec![pad("VOL1", 80), pad("VOL1", 80)];
        let mut reader = reader(&lines);
        reader.read().unwrap();
        let err = reader.read().unwrap_err();
        assert!(matches!(
            err,
            BacsError::Structure {
                line: Some(2),
                violation: StructureViolation::TooMany { .. }
            }
        ));
        assert!(reader.is_closed());
        assert_eq!(reader.record_kind(), None);
    }
}
