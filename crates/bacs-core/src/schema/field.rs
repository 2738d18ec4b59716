//! Fixed-width field descriptors.

use regex::Regex;
use thiserror::Error;
use tracing::trace;

use crate::codec::{HandlerRef, Value};
use crate::error::CodecError;

/// A field conversion failure, named by its (dotted) field path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {source}")]
pub struct FieldError {
    pub field: String,
    #[source]
    pub source: CodecError,
}

impl FieldError {
    pub fn new(field: impl Into<String>, source: CodecError) -> Self {
        Self {
            field: field.into(),
            source,
        }
    }

    /// Prefix the field path with an enclosing segment name.
    pub fn within(mut self, segment: &str) -> Self {
        self.field = format!("{segment}.{}", self.field);
        self
    }
}

/// Predicate deciding whether a line belongs to a record type.
#[derive(Debug, Clone)]
pub enum IdentifyRule {
    /// Substring equals the literal.
    Literal(String),
    /// Substring is a full match of the (anchored) regex.
    Pattern(Regex),
    /// Substring does not contain the literal anywhere.
    Absent(String),
}

impl IdentifyRule {
    /// Compile a full-match pattern rule.
    pub fn pattern(expr: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{expr})$")).map(IdentifyRule::Pattern)
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            IdentifyRule::Literal(literal) => text == literal,
            IdentifyRule::Pattern(regex) => regex.is_match(text),
            IdentifyRule::Absent(literal) => !text.contains(literal.as_str()),
        }
    }
}

/// Descriptor of one fixed-width field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub offset: usize,
    pub length: usize,
    pub trim: bool,
    pub optional: bool,
    pub handler: Option<HandlerRef>,
    pub identify: Option<IdentifyRule>,
}

impl FieldSpec {
    /// Create a plain text field at `offset..offset + length`.
    pub fn new(name: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            length,
            trim: false,
            optional: false,
            handler: None,
            identify: None,
        }
    }

    /// Create a record identifier field. Its value is never extracted.
    pub fn rid(name: impl Into<String>, offset: usize, length: usize, rule: IdentifyRule) -> Self {
        Self::new(name, offset, length).identified_by(rule)
    }

    /// Strip leading and trailing blanks before conversion.
    pub fn with_trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Convert the field with a named type handler.
    pub fn with_handler(mut self, handler: HandlerRef) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Allow the field to be missing from short lines or left blank.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn identified_by(mut self, rule: IdentifyRule) -> Self {
        self.identify = Some(rule);
        self
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_identifier(&self) -> bool {
        self.identify.is_some()
    }

    /// The raw substring this field covers, if the line holds all of it.
    pub fn slice<'l>(&self, line: &'l str) -> Option<&'l str> {
        line.get(self.offset..self.end())
    }

    /// Whether the line satisfies this field's identify rule.
    ///
    /// Fields without a rule accept every line.
    pub fn identifies(&self, line: &str) -> bool {
        match &self.identify {
            Some(rule) => self.slice(line).is_some_and(|text| rule.matches(text)),
            None => true,
        }
    }

    /// Extract and convert the field value from a line.
    ///
    /// Returns `Ok(None)` for an optional field that is absent or blank.
    pub fn extract(&self, line: &str) -> Result<Option<Value>, FieldError> {
        let Some(raw) = self.slice(line) else {
            if self.optional && line.len() < self.end() {
                return Ok(None);
            }
            return Err(FieldError::new(
                &self.name,
                CodecError::OutOfRange {
                    start: self.offset,
                    end: self.end(),
                    len: line.len(),
                },
            ));
        };

        let text = if self.trim { raw.trim() } else { raw };
        if self.optional && text.trim().is_empty() {
            return Ok(None);
        }

        let value = match self.handler {
            Some(handler) => handler
                .handler()
                .decode(text)
                .map_err(|e| FieldError::new(&self.name, e))?,
            None => Value::Text(text.to_string()),
        };
        trace!("field {} = {}", self.name, value);

        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_literal_rule() {
        let field = FieldSpec::rid("type", 0, 4, IdentifyRule::Literal("VOL1".into()));
        assert!(field.identifies("VOL1123456"));
        assert!(!field.identifies("HDR1123456"));
        assert!(!field.identifies("VOL"));
    }

    #[test]
    fn test_pattern_rule_is_full_match() {
        let rule = IdentifyRule::pattern(r"\d{4}").unwrap();
        assert!(rule.matches("1234"));
        assert!(!rule.matches("12345"));
        assert!(!rule.matches("12a4"));
    }

    #[test]
    fn test_absent_rule() {
        let rule = IdentifyRule::Absent("CONTRA".into());
        assert!(rule.matches("123456"));
        assert!(!rule.matches("CONTRA"));
    }

    #[test]
    fn test_extract_untrimmed_text() {
        let field = FieldSpec::new("name", 2, 6);
        assert_eq!(
            field.extract("abACME  xyz").unwrap(),
            Some(Value::Text("ACME  ".into()))
        );
    }

    #[test]
    fn test_extract_with_handler() {
        let field = FieldSpec::new("amount", 0, 11).with_handler(HandlerRef::Pence);
        assert_eq!(
            field.extract("00000012345").unwrap(),
            Some(Value::Amount(Decimal::new(12345, 2)))
        );
    }

    #[test]
    fn test_extract_reports_field_name() {
        let field = FieldSpec::new("amount", 0, 11).with_handler(HandlerRef::Pence);
        let err = field.extract("0000001234X").unwrap_err();
        assert_eq!(err.field, "amount");
        assert!(matches!(err.source, CodecError::NotDigits(_)));
    }

    #[test]
    fn test_optional_field_absent_or_blank() {
        let field = FieldSpec::new("processingDate", 4, 6)
            .with_handler(HandlerRef::JulianDate)
            .optional();
        assert_eq!(field.extract("abcd").unwrap(), None);
        assert_eq!(field.extract("abcd      ").unwrap(), None);
        assert!(field.extract("abcd 24001").unwrap().is_some());
    }

    #[test]
    fn test_optional_field_splitting_a_character_is_an_error() {
        let field = FieldSpec::new("name", 4, 1).optional();
        let line = "abcé";
        assert_eq!(line.len(), 5);
        let err = field.extract(line).unwrap_err();
        assert!(matches!(err.source, CodecError::OutOfRange { start: 4, end: 5, len: 5 }));
    }

    #[test]
    fn test_required_field_out_of_range() {
        let field = FieldSpec::new("label", 79, 1);
        let err = field.extract("short").unwrap_err();
        assert!(matches!(err.source, CodecError::OutOfRange { start: 79, end: 80, len: 5 }));
    }
}
