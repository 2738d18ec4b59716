//! Domain entities built from extracted record values.
//!
//! Each [`RowKind`] maps to exactly one [`Entity`] variant. Text is stored
//! without its trailing blank padding.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::row::RowKind;
use super::transaction::{TransactionCode, UnknownCode};
use crate::schema::{FieldError, FieldValues};
use crate::standard18::names::*;

type BuildResult<T> = std::result::Result<T, FieldError>;

fn text(values: &FieldValues, name: &str) -> BuildResult<String> {
    Ok(values.text(name)?.trim_end().to_string())
}

fn optional_text(values: &FieldValues, name: &str) -> BuildResult<Option<String>> {
    Ok(values
        .optional_text(name)?
        .map(|t| t.trim_end().to_string())
        .filter(|t| !t.is_empty()))
}

/// Volume header label (VOL1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub serial_no: String,
    pub accessibility: String,
    pub user_number: String,
    pub label: String,
}

impl Volume {
    fn build(values: &FieldValues) -> BuildResult<Self> {
        Ok(Self {
            serial_no: text(values, SERIAL_NO)?,
            accessibility: text(values, ACCESSIBILITY)?,
            user_number: text(values, USER_NUMBER)?,
            label: text(values, LABEL)?,
        })
    }
}

/// First file header or end-of-file label (HDR1 / EOF1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header1 {
    /// `Hdr1` or `Eof1`.
    pub indicator: RowKind,
    pub file: String,
    pub set: String,
    pub section: String,
    pub sequence: String,
    pub generation: String,
    pub version: String,
    pub created: Option<NaiveDate>,
    pub expires: Option<NaiveDate>,
    pub accessibility: String,
    pub block_count: String,
    pub system_code: String,
}

impl Header1 {
    fn build(indicator: RowKind, values: &FieldValues) -> BuildResult<Self> {
        Ok(Self {
            indicator,
            file: text(values, FILE)?,
            set: text(values, SET)?,
            section: text(values, SECTION)?,
            sequence: text(values, SEQUENCE)?,
            generation: text(values, GENERATION)?,
            version: text(values, VERSION)?,
            created: values.optional_date(CREATED)?,
            expires: values.optional_date(EXPIRES)?,
            accessibility: text(values, ACCESSIBILITY)?,
            block_count: text(values, BLOCK_COUNT)?,
            system_code: text(values, SYSTEM_CODE)?,
        })
    }
}

/// Second file header or end-of-file label (HDR2 / EOF2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header2 {
    /// `Hdr2` or `Eof2`.
    pub indicator: RowKind,
    pub format: String,
    pub block: String,
    pub record: String,
    pub offset: String,
}

impl Header2 {
    fn build(indicator: RowKind, values: &FieldValues) -> BuildResult<Self> {
        Ok(Self {
            indicator,
            format: text(values, FORMAT)?,
            block: text(values, BLOCK)?,
            record: text(values, RECORD)?,
            offset: text(values, OFFSET)?,
        })
    }
}

/// User header label (UHL1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHeader {
    pub processing_date: NaiveDate,
    pub dest: String,
    pub currency: String,
    pub country: String,
    pub work_code: String,
    pub file: String,
    pub audit: String,
}

impl UserHeader {
    fn build(values: &FieldValues) -> BuildResult<Self> {
        Ok(Self {
            processing_date: values.date(PROCESSING_DATE)?,
            dest: text(values, DEST)?,
            currency: text(values, CURRENCY)?,
            country: text(values, COUNTRY)?,
            work_code: text(values, WORK_CODE)?,
            file: text(values, FILE)?,
            audit: text(values, AUDIT)?,
        })
    }
}

/// User trailer label (UTL1) carrying the batch control totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTrailer {
    pub debit_value: Decimal,
    pub credit_value: Decimal,
    pub debit_count: String,
    pub credit_count: String,
    pub ddi_count: String,
    pub service_user: String,
}

impl UserTrailer {
    fn build(values: &FieldValues) -> BuildResult<Self> {
        Ok(Self {
            debit_value: values.amount(DEBIT_VALUE)?,
            credit_value: values.amount(CREDIT_VALUE)?,
            debit_count: text(values, DEBIT_COUNT)?,
            credit_count: text(values, CREDIT_COUNT)?,
            ddi_count: text(values, DDI_COUNT)?,
            service_user: text(values, SERVICE_USER)?,
        })
    }

    /// Declared number of debit items, if the count is numeric.
    pub fn debit_items(&self) -> Option<u64> {
        parse_count(&self.debit_count)
    }

    /// Declared number of credit items, if the count is numeric.
    pub fn credit_items(&self) -> Option<u64> {
        parse_count(&self.credit_count)
    }

    /// Declared number of AUDDIS items. A blank count means zero.
    pub fn ddi_items(&self) -> Option<u64> {
        if self.ddi_count.trim().is_empty() {
            return Some(0);
        }
        parse_count(&self.ddi_count)
    }
}

fn parse_count(count: &str) -> Option<u64> {
    count.trim().parse().ok()
}

/// A bank account as written on a payment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub sort_code: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Account {
    fn build(values: &FieldValues) -> BuildResult<Self> {
        Ok(Self {
            sort_code: text(values, SORT_CODE)?,
            number: text(values, NUMBER)?,
            account_type: optional_text(values, TYPE)?,
            name: optional_text(values, NAME)?,
        })
    }

    fn from_segment(values: &FieldValues, segment: &str) -> BuildResult<Self> {
        let account = values.required_segment(segment)?;
        Account::build(account).map_err(|e| e.within(segment))
    }
}

/// Contra (balancing) line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contra {
    /// 1-based input line number.
    pub line_no: usize,
    pub destination: Account,
    pub transaction_type: String,
    pub origin: Account,
    pub free_format: String,
    pub amount: Decimal,
    pub narrative: String,
    pub processing_date: Option<NaiveDate>,
}

impl Contra {
    fn build(values: &FieldValues, line_no: usize) -> BuildResult<Self> {
        Ok(Self {
            line_no,
            destination: Account::from_segment(values, DESTINATION)?,
            transaction_type: text(values, TRANSACTION_TYPE)?,
            origin: Account::from_segment(values, ORIGIN)?,
            free_format: text(values, FREE_FORMAT)?,
            amount: values.amount(AMOUNT)?,
            narrative: text(values, NARRATIVE)?,
            processing_date: values.optional_date(PROCESSING_DATE)?,
        })
    }

    pub fn transaction_code(&self) -> Result<TransactionCode, UnknownCode> {
        TransactionCode::by_code(&self.transaction_type)
    }
}

/// Payment instruction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// 1-based input line number.
    pub line_no: usize,
    pub destination: Account,
    pub transaction_type: String,
    pub origin: Account,
    pub rti: String,
    pub amount: Decimal,
    pub reference: String,
    pub processing_date: Option<NaiveDate>,
}

impl Instruction {
    fn build(values: &FieldValues, line_no: usize) -> BuildResult<Self> {
        Ok(Self {
            line_no,
            destination: Account::from_segment(values, DESTINATION)?,
            transaction_type: text(values, TRANSACTION_TYPE)?,
            origin: Account::from_segment(values, ORIGIN)?,
            rti: text(values, RTI)?,
            amount: values.amount(AMOUNT)?,
            reference: text(values, REFERENCE)?,
            processing_date: values.optional_date(PROCESSING_DATE)?,
        })
    }

    pub fn transaction_code(&self) -> Result<TransactionCode, UnknownCode> {
        TransactionCode::by_code(&self.transaction_type)
    }
}

/// A built record, one variant per record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Entity {
    Volume(Volume),
    Header1(Header1),
    Header2(Header2),
    UserHeader(UserHeader),
    UserTrailer(UserTrailer),
    Contra(Contra),
    Instruction(Instruction),
}

impl Entity {
    /// Build the entity for `kind` from its extracted values.
    pub fn build(kind: RowKind, values: &FieldValues, line_no: usize) -> BuildResult<Self> {
        Ok(match kind {
            RowKind::Vol1 => Entity::Volume(Volume::build(values)?),
            RowKind::Hdr1 | RowKind::Eof1 => Entity::Header1(Header1::build(kind, values)?),
            RowKind::Hdr2 | RowKind::Eof2 => Entity::Header2(Header2::build(kind, values)?),
            RowKind::Uhl1 => Entity::UserHeader(UserHeader::build(values)?),
            RowKind::Utl1 => Entity::UserTrailer(UserTrailer::build(values)?),
            RowKind::Contra => Entity::Contra(Contra::build(values, line_no)?),
            RowKind::Instr => Entity::Instruction(Instruction::build(values, line_no)?),
        })
    }

    pub fn kind(&self) -> RowKind {
        match self {
            Entity::Volume(_) => RowKind::Vol1,
            Entity::Header1(h) => h.indicator,
            Entity::Header2(h) => h.indicator,
            Entity::UserHeader(_) => RowKind::Uhl1,
            Entity::UserTrailer(_) => RowKind::Utl1,
            Entity::Contra(_) => RowKind::Contra,
            Entity::Instruction(_) => RowKind::Instr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Value;
    use crate::error::CodecError;
    use crate::models::transaction::DebitCode;
    use pretty_assertions::assert_eq;

    fn account(sort_code: &str, number: &str, name: Option<&str>) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert(SORT_CODE, Value::Text(sort_code.into()));
        values.insert(NUMBER, Value::Text(number.into()));
        values.insert(TYPE, Value::Text("0".into()));
        if let Some(name) = name {
            values.insert(NAME, Value::Text(format!("{name:<18}")));
        }
        values
    }

    fn instruction_values() -> FieldValues {
        let mut values = FieldValues::new();
        values.insert_segment(DESTINATION, account("123456", "12345678", Some("J SMITH")));
        values.insert_segment(ORIGIN, account("876543", "21000000", Some("ACME LTD")));
        values.insert(TRANSACTION_TYPE, Value::Text("17".into()));
        values.insert(RTI, Value::Text("    ".into()));
        values.insert(AMOUNT, Value::Amount(Decimal::new(12345, 2)));
        values.insert(REFERENCE, Value::Text(format!("{:<18}", "INV 42")));
        values
    }

    #[test]
    fn test_build_instruction() {
        let entity = Entity::build(RowKind::Instr, &instruction_values(), 7).unwrap();
        let Entity::Instruction(instr) = &entity else {
            panic!("expected instruction, got {entity:?}");
        };
        assert_eq!(entity.kind(), RowKind::Instr);
        assert_eq!(instr.line_no, 7);
        assert_eq!(instr.amount, Decimal::new(12345, 2));
        assert_eq!(instr.reference, "INV 42");
        assert_eq!(instr.rti, "");
        assert_eq!(instr.destination.name.as_deref(), Some("J SMITH"));
        assert_eq!(instr.processing_date, None);
        assert_eq!(
            instr.transaction_code(),
            Ok(TransactionCode::Debit(DebitCode::Regular))
        );
    }

    #[test]
    fn test_missing_segment_field_names_path() {
        let mut values = instruction_values();
        values.insert_segment(ORIGIN, FieldValues::new());
        let err = Entity::build(RowKind::Instr, &values, 1).unwrap_err();
        assert_eq!(err.field, "origin.sortCode");
        assert_eq!(err.source, CodecError::Missing);
    }

    #[test]
    fn test_header_indicator_follows_kind() {
        let mut values = FieldValues::new();
        for name in [FORMAT, BLOCK, RECORD, OFFSET] {
            values.insert(name, Value::Text(String::new()));
        }
        let entity = Entity::build(RowKind::Eof2, &values, 1).unwrap();
        assert_eq!(entity.kind(), RowKind::Eof2);
    }

    #[test]
    fn test_trailer_counts() {
        let trailer = UserTrailer {
            debit_value: Decimal::ZERO,
            credit_value: Decimal::ZERO,
            debit_count: "0000002".into(),
            credit_count: "00000x1".into(),
            ddi_count: "       ".into(),
            service_user: String::new(),
        };
        assert_eq!(trailer.debit_items(), Some(2));
        assert_eq!(trailer.credit_items(), None);
        assert_eq!(trailer.ddi_items(), Some(0));
    }
}
