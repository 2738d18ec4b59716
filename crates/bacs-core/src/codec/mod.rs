//! Type handlers converting fixed-width field text to typed values.

pub mod julian;
pub mod pence;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

pub use julian::JulianDateCodec;
pub use pence::PenceCodec;

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Raw (optionally trimmed) text.
    Text(String),
    /// Date decoded from banking Julian form.
    Date(NaiveDate),
    /// Currency amount decoded from whole pence.
    Amount(Decimal),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Amount(a) => write!(f, "{a}"),
        }
    }
}

/// Trait for stateless field converters.
pub trait TypeHandler {
    /// Name the handler is registered under.
    fn name(&self) -> &'static str;

    /// Convert field text to a typed value.
    fn decode(&self, text: &str) -> Result<Value, CodecError>;

    /// Convert a typed value back to field text of exactly `width` characters.
    fn encode(&self, value: &Value, width: usize) -> Result<String, CodecError>;
}

/// Reference to one of the named type handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerRef {
    JulianDate,
    Pence,
}

impl HandlerRef {
    /// Resolve the reference to its handler.
    pub fn handler(self) -> &'static dyn TypeHandler {
        match self {
            HandlerRef::JulianDate => &JulianDateCodec,
            HandlerRef::Pence => &PenceCodec,
        }
    }

    /// Registered handler name.
    pub fn name(self) -> &'static str {
        self.handler().name()
    }
}

impl FromStr for HandlerRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            julian::NAME => Ok(HandlerRef::JulianDate),
            pence::NAME => Ok(HandlerRef::Pence),
            other => Err(format!("unknown type handler: {other}")),
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_lookup_by_name() {
        assert_eq!("julianDateHandler".parse(), Ok(HandlerRef::JulianDate));
        assert_eq!("penceHandler".parse(), Ok(HandlerRef::Pence));
        assert!("dateHandler".parse::<HandlerRef>().is_err());
    }

    #[test]
    fn test_handler_names_round_trip() {
        for handler in [HandlerRef::JulianDate, HandlerRef::Pence] {
            assert_eq!(handler.name().parse(), Ok(handler));
        }
    }
}
