//! Banking Julian date codec.
//!
//! A Standard 18 date is six characters: a century flag followed by a
//! two-digit year and a three-digit day of the year. A blank flag means the
//! 2000s, which is how every current file is written, so `" 24032"` is
//! 1 February 2024. A digit flag `c` selects the years `1900 + 100 * c`
//! onwards; `0` therefore means the 1900s. Flag `1` would name the 2000s
//! a second time and is rejected, so every accepted text has one date.

use chrono::{Datelike, NaiveDate};

use super::{TypeHandler, Value, all_digits};
use crate::error::CodecError;

pub(crate) const NAME: &str = "julianDateHandler";

/// Field width of an encoded date.
pub const WIDTH: usize = 6;

const BLANK_CENTURY: i32 = 2000;

/// Banking Julian date codec.
pub struct JulianDateCodec;

impl JulianDateCodec {
    /// Decode `[c]yyddd` (the flag may be trimmed away) into a date.
    pub fn decode_date(text: &str) -> Result<NaiveDate, CodecError> {
        let text = text.trim();
        if !text.is_ascii() {
            return Err(CodecError::NotDigits(text.to_string()));
        }
        let (century, rest) = match text.len() {
            5 => (BLANK_CENTURY, text),
            6 => {
                let flag = &text[..1];
                if !all_digits(flag) {
                    return Err(CodecError::NotDigits(text.to_string()));
                }
                if flag == "1" {
                    return Err(CodecError::NonCanonicalCentury(text.to_string()));
                }
                (1900 + 100 * flag.parse::<i32>().unwrap_or(0), &text[1..])
            }
            _ => {
                return Err(CodecError::Width {
                    expected: "5 or 6".to_string(),
                    found: text.to_string(),
                });
            }
        };

        if !all_digits(rest) {
            return Err(CodecError::NotDigits(text.to_string()));
        }

        let year = century + rest[..2].parse::<i32>().unwrap_or(0);
        let day = rest[2..].parse::<u32>().unwrap_or(0);
        if !(1..=366).contains(&day) {
            return Err(CodecError::DayOutOfRange { year, day });
        }

        NaiveDate::from_yo_opt(year, day).ok_or(CodecError::DayOutOfRange { year, day })
    }

    /// Encode a date in its canonical six-character form.
    pub fn encode_date(date: NaiveDate) -> Result<String, CodecError> {
        let year = date.year();
        if !(1900..=2899).contains(&year) {
            return Err(CodecError::YearOutOfRange(year));
        }

        let flag = if (BLANK_CENTURY..BLANK_CENTURY + 100).contains(&year) {
            ' '
        } else {
            char::from(b'0' + ((year - 1900) / 100) as u8)
        };

        Ok(format!("{}{:02}{:03}", flag, year % 100, date.ordinal()))
    }
}

impl TypeHandler for JulianDateCodec {
    fn name(&self) -> &'static str {
        NAME
    }

    fn decode(&self, text: &str) -> Result<Value, CodecError> {
        Self::decode_date(text).map(Value::Date)
    }

    fn encode(&self, value: &Value, width: usize) -> Result<String, CodecError> {
        let Value::Date(date) = value else {
            return Err(CodecError::WrongType {
                handler: NAME,
                value: value.to_string(),
            });
        };

        let text = Self::encode_date(*date)?;
        if width < WIDTH {
            return Err(CodecError::Overflow { value: text, width });
        }
        Ok(format!("{text:>width$}"))
    }
}
