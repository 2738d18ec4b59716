//! Segments: groups of fields populating one sub-entity.

use super::field::{FieldError, FieldSpec};
use super::values::FieldValues;

/// An ordered group of fields (and nested segments) building one sub-entity.
///
/// Field offsets are absolute within the owning record's line.
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub nested: Vec<SegmentSpec>,
}

impl SegmentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn segment(mut self, segment: SegmentSpec) -> Self {
        self.nested.push(segment);
        self
    }

    /// All fields of this segment and its nested segments.
    pub fn all_fields(&self) -> Vec<&FieldSpec> {
        let mut fields: Vec<&FieldSpec> = self.fields.iter().collect();
        for nested in &self.nested {
            fields.extend(nested.all_fields());
        }
        fields
    }

    pub fn extract(&self, line: &str) -> Result<FieldValues, FieldError> {
        let mut values = FieldValues::new();
        for field in self.fields.iter().filter(|f| !f.is_identifier()) {
            if let Some(value) = field.extract(line).map_err(|e| e.within(&self.name))? {
                values.insert(field.name.clone(), value);
            }
        }
        for nested in &self.nested {
            let nested_values = nested.extract(line).map_err(|e| e.within(&self.name))?;
            values.insert_segment(nested.name.clone(), nested_values);
        }
        Ok(values)
    }
}
