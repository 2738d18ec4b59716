//! Error types for the bacs-core library.

use thiserror::Error;

/// Main error type for the bacs library.
#[derive(Error, Debug)]
pub enum BacsError {
    /// A field's raw content could not be converted by its type handler.
    #[error("format error at line {line}, {record}.{field}: {source}")]
    Format {
        line: usize,
        record: String,
        field: String,
        #[source]
        source: CodecError,
    },

    /// A line matched no record schema at the current grammar position.
    #[error("line {line} matches no record: {content:?}")]
    Classification { line: usize, content: String },

    /// A reader advanced without exposing the record's kind or values.
    #[error("line {line}: reader returned a record without kind or values")]
    IncompleteRecord { line: usize },

    /// An occurrence bound was violated.
    #[error("structure error {}: {violation}", at_line(.line))]
    Structure {
        /// Line at which the violation was detected, `None` at end of input.
        line: Option<usize>,
        violation: StructureViolation,
    },

    /// A schema definition breaks one of its own invariants.
    #[error("invalid schema {schema}: {reason}")]
    Schema { schema: String, reason: String },

    /// The upload host could not be reached.
    #[error("cannot connect to {host}: {source}")]
    Connectivity {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("at line {line}"),
        None => "at end of input".to_string(),
    }
}

/// Occurrence-bound violations reported through [`BacsError::Structure`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureViolation {
    /// A record or group was skipped or closed before reaching `min_occurs`.
    #[error("missing {name}: expected at least {min}, found {found}")]
    Missing { name: String, min: usize, found: usize },

    /// A record or group matched again after reaching `max_occurs`.
    #[error("too many {name}: at most {max} allowed")]
    TooMany { name: String, max: usize },
}

/// Errors raised by type handlers while converting field text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Content holds something other than the expected digits.
    #[error("expected digits, found {0:?}")]
    NotDigits(String),

    /// Content has the wrong number of characters.
    #[error("expected {expected} characters, found {found:?}")]
    Width { expected: String, found: String },

    /// Julian day-of-year outside `1..=366` or past the end of its year.
    #[error("day {day} out of range for year {year}")]
    DayOutOfRange { year: i32, day: u32 },

    /// Century flag `1` spells the blank-flag century a second way.
    #[error("century flag 1 is not canonical in {0:?}, the 2000s use a blank flag")]
    NonCanonicalCentury(String),

    /// Date cannot be represented with a one-digit century flag.
    #[error("year {0} cannot be encoded")]
    YearOutOfRange(i32),

    /// Amount is negative.
    #[error("negative amount {0}")]
    Negative(String),

    /// Amount has fractions of a penny.
    #[error("amount {0} is not a whole number of pence")]
    FractionalPence(String),

    /// Encoded value does not fit the field width.
    #[error("{value} does not fit in {width} characters")]
    Overflow { value: String, width: usize },

    /// Value has the wrong type for this handler.
    #[error("{handler} cannot encode {value}")]
    WrongType { handler: &'static str, value: String },

    /// A field lies outside the line or splits a multi-byte character.
    #[error("field range {start}..{end} not available in line of {len} bytes")]
    OutOfRange { start: usize, end: usize, len: usize },

    /// A value required to build an entity was absent.
    #[error("missing value")]
    Missing,
}

/// Result type for the bacs library.
pub type Result<T> = std::result::Result<T, BacsError>;
