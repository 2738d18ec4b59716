//! Record schemas: one physical-line shape each.

use std::fmt;

use super::field::{FieldError, FieldSpec};
use super::segment::SegmentSpec;
use super::values::FieldValues;
use crate::error::{BacsError, Result};
use crate::models::row::RowKind;

/// Occurrence bounds of a record or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: usize,
    /// `None` means unbounded.
    pub max: Option<usize>,
}

impl Occurs {
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Exactly once.
    pub const fn once() -> Self {
        Self::new(1, Some(1))
    }

    /// Zero or one.
    pub const fn optional() -> Self {
        Self::new(0, Some(1))
    }

    /// Zero or more.
    pub const fn any() -> Self {
        Self::new(0, None)
    }

    /// Whether `count` occurrences stay within the upper bound.
    pub fn allows(&self, count: usize) -> bool {
        self.max.is_none_or(|max| count <= max)
    }

    pub fn is_satisfied(&self, count: usize) -> bool {
        count >= self.min
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{{{},{}}}", self.min, max),
            None => write!(f, "{{{},*}}", self.min),
        }
    }
}

/// Schema of one physical-line record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub kind: RowKind,
    pub min_length: usize,
    pub max_length: usize,
    pub occurs: Occurs,
    pub fields: Vec<FieldSpec>,
    pub segments: Vec<SegmentSpec>,
}

impl RecordSchema {
    /// Create an 80-byte record occurring at most once.
    pub fn new(kind: RowKind) -> Self {
        Self {
            kind,
            min_length: 80,
            max_length: 80,
            occurs: Occurs::optional(),
            fields: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self.max_length = length;
        self
    }

    pub fn with_length_range(mut self, min: usize, max: usize) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn segment(mut self, segment: SegmentSpec) -> Self {
        self.segments.push(segment);
        self
    }

    /// Fields taking part in classification.
    pub fn identifiers(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_identifier())
    }

    /// Whether a line has this record's length and satisfies every identify rule.
    pub fn matches(&self, line: &str) -> bool {
        (self.min_length..=self.max_length).contains(&line.len())
            && self.identifiers().all(|field| field.identifies(line))
    }

    /// Extract business fields and segments from a matched line.
    pub fn extract(&self, line: &str) -> std::result::Result<FieldValues, FieldError> {
        let mut values = FieldValues::new();
        for field in self.fields.iter().filter(|f| !f.is_identifier()) {
            if let Some(value) = field.extract(line)? {
                values.insert(field.name.clone(), value);
            }
        }
        for segment in &self.segments {
            values.insert_segment(segment.name.clone(), segment.extract(line)?);
        }
        Ok(values)
    }

    /// Check length, offset and occurrence invariants.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| {
            Err(BacsError::Schema {
                schema: self.name().to_string(),
                reason,
            })
        };

        if self.min_length > self.max_length {
            return fail(format!(
                "min length {} exceeds max length {}",
                self.min_length, self.max_length
            ));
        }
        if self.occurs.max.is_some_and(|max| max < self.occurs.min) {
            return fail(format!("invalid occurrence bounds {}", self.occurs));
        }

        let mut business: Vec<&FieldSpec> = Vec::new();
        let all = self
            .fields
            .iter()
            .chain(self.segments.iter().flat_map(|s| s.all_fields()));
        for field in all {
            if field.length == 0 {
                return fail(format!("field {} has zero length", field.name));
            }
            if field.end() > self.max_length {
                return fail(format!(
                    "field {} ends at {} past max length {}",
                    field.name,
                    field.end(),
                    self.max_length
                ));
            }
            if !field.optional && field.end() > self.min_length {
                return fail(format!(
                    "required field {} ends at {} past min length {}",
                    field.name,
                    field.end(),
                    self.min_length
                ));
            }
            if !field.is_identifier() {
                business.push(field);
            }
        }

        business.sort_by_key(|f| f.offset);
        for pair in business.windows(2) {
            if pair[0].end() > pair[1].offset {
                return fail(format!("fields {} and {} overlap", pair[0].name, pair[1].name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::IdentifyRule;

    fn header() -> RecordSchema {
        RecordSchema::new(RowKind::Hdr1)
            .field(FieldSpec::rid("type", 0, 4, IdentifyRule::Literal("HDR1".into())))
            .field(FieldSpec::new("file", 4, 17))
    }

    #[test]
    fn test_occurs_bounds() {
        assert!(Occurs::any().allows(1_000));
        assert!(!Occurs::once().allows(2));
        assert!(!Occurs::once().is_satisfied(0));
        assert_eq!(Occurs::any().to_string(), "{0,*}");
    }

    #[test]
    fn test_matches_requires_length_and_identifier() {
        let record = header();
        let line = format!("{:<80}", "HDR1");
        assert!(record.matches(&line));
        assert!(!record.matches(&format!("{:<79}", "HDR1")));
        assert!(!record.matches(&format!("{:<81}", "HDR1")));
        assert!(!record.matches(&format!("{:<80}", "HDR2")));
    }

    #[test]
    fn test_extract_skips_identifiers() {
        let record = header();
        let line = format!("{:<80}", "HDR1A FILE NAME");
        let values = record.extract(&line).unwrap();
        assert!(values.get("type").is_none());
        assert_eq!(values.text("file").unwrap(), "A FILE NAME      ");
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let record = header().field(FieldSpec::new("set", 20, 6));
        assert!(matches!(record.validate(), Err(BacsError::Schema { .. })));
    }

    #[test]
    fn test_validate_rejects_field_past_end() {
        let record = header().field(FieldSpec::new("tail", 78, 4));
        assert!(record.validate().is_err());
        assert!(header().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_required_field_past_min_length() {
        let record = header()
            .with_length_range(60, 80)
            .field(FieldSpec::new("late", 70, 4));
        assert!(record.validate().is_err());

        let record = header()
            .with_length_range(60, 80)
            .field(FieldSpec::new("late", 70, 4).optional());
        assert!(record.validate().is_ok());
    }
}
