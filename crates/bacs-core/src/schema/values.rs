//! Generic typed value set extracted from one record.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::field::FieldError;
use crate::codec::Value;
use crate::error::CodecError;

/// Named field values and nested segment values of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldValues {
    fields: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    segments: BTreeMap<String, FieldValues>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn insert_segment(&mut self, name: impl Into<String>, values: FieldValues) {
        self.segments.insert(name.into(), values);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn segment(&self, name: &str) -> Option<&FieldValues> {
        self.segments.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.segments.is_empty()
    }

    /// Field names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn text(&self, name: &str) -> Result<String, FieldError> {
        self.optional_text(name)?
            .ok_or_else(|| FieldError::new(name, CodecError::Missing))
    }

    pub fn optional_text(&self, name: &str) -> Result<Option<String>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text.clone())),
            Some(other) => Err(wrong_type(name, other)),
        }
    }

    pub fn amount(&self, name: &str) -> Result<Decimal, FieldError> {
        match self.get(name) {
            None => Err(FieldError::new(name, CodecError::Missing)),
            Some(Value::Amount(amount)) => Ok(*amount),
            Some(other) => Err(wrong_type(name, other)),
        }
    }

    pub fn date(&self, name: &str) -> Result<NaiveDate, FieldError> {
        self.optional_date(name)?
            .ok_or_else(|| FieldError::new(name, CodecError::Missing))
    }

    pub fn optional_date(&self, name: &str) -> Result<Option<NaiveDate>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Date(date)) => Ok(Some(*date)),
            Some(other) => Err(wrong_type(name, other)),
        }
    }

    pub fn required_segment(&self, name: &str) -> Result<&FieldValues, FieldError> {
        self.segment(name)
            .ok_or_else(|| FieldError::new(name, CodecError::Missing))
    }
}

fn wrong_type(name: &str, value: &Value) -> FieldError {
    FieldError::new(
        name,
        CodecError::WrongType {
            handler: "value",
            value: value.to_string(),
        },
    )
}
