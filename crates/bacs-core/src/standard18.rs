//! The BACS Standard 18 file layout.
//!
//! Offsets and lengths here are the wire contract of the format.

use lazy_static::lazy_static;
use regex::Regex;

use crate::codec::HandlerRef;
use crate::models::row::RowKind;
use crate::schema::{FieldSpec, GroupSchema, IdentifyRule, Occurs, RecordSchema, SegmentSpec};

/// Name of the top-level stream group.
pub const STANDARD_18: &str = "standard18";

/// Name of the repeating batch group.
pub const BATCH: &str = "batch";

/// Field and segment names shared by the schema and the entity builders.
pub mod names {
    pub const TYPE: &str = "type";
    pub const SERIAL_NO: &str = "serialNo";
    pub const USER_NUMBER: &str = "userNumber";
    pub const LABEL: &str = "label";
    pub const SET: &str = "set";
    pub const SECTION: &str = "section";
    pub const SEQUENCE: &str = "sequence";
    pub const GENERATION: &str = "generation";
    pub const VERSION: &str = "version";
    pub const CREATED: &str = "created";
    pub const EXPIRES: &str = "expires";
    pub const ACCESSIBILITY: &str = "accessibility";
    pub const BLOCK_COUNT: &str = "blockCount";
    pub const SYSTEM_CODE: &str = "systemCode";
    pub const FORMAT: &str = "format";
    pub const BLOCK: &str = "block";
    pub const RECORD: &str = "record";
    pub const OFFSET: &str = "offset";
    pub const DEST: &str = "dest";
    pub const CURRENCY: &str = "currency";
    pub const COUNTRY: &str = "country";
    pub const WORK_CODE: &str = "workCode";
    pub const FILE: &str = "file";
    pub const AUDIT: &str = "audit";
    pub const DEBIT_VALUE: &str = "debitValue";
    pub const CREDIT_VALUE: &str = "creditValue";
    pub const DEBIT_COUNT: &str = "debitCount";
    pub const CREDIT_COUNT: &str = "creditCount";
    pub const DDI_COUNT: &str = "ddiCount";
    pub const SERVICE_USER: &str = "serviceUser";
    pub const FREE_FORMAT: &str = "freeFormat";
    pub const NARRATIVE: &str = "narrative";
    pub const CONTRA: &str = "contra";
    pub const DESTINATION: &str = "destination";
    pub const TRANSACTION_TYPE: &str = "transactionType";
    pub const ORIGIN: &str = "origin";
    pub const SORT_CODE: &str = "sortCode";
    pub const NUMBER: &str = "number";
    pub const NAME: &str = "name";
    pub const RTI: &str = "rti";
    pub const AMOUNT: &str = "amount";
    pub const REFERENCE: &str = "reference";
    pub const PROCESSING_DATE: &str = "processingDate";
}

use names::*;

/// Length range of contra and instruction lines.
pub const PAYMENT_MIN_LENGTH: usize = 100;
pub const PAYMENT_MAX_LENGTH: usize = 106;

lazy_static! {
    /// Instruction lines start with four digits (the destination sort code).
    pub static ref INSTRUCTION_PREFIX: Regex = Regex::new(r"^\d{4}$").unwrap();
}

/// Assemble the full Volume / Batch grammar.
pub fn schema() -> GroupSchema {
    GroupSchema::new(STANDARD_18)
        .with_occurs(Occurs::once())
        .record(1, volume_record())
        .group(
            2,
            GroupSchema::new(BATCH)
                .with_occurs(Occurs::any())
                .record(3, header1_record(RowKind::Hdr1))
                .record(4, header2_record(RowKind::Hdr2))
                .record(5, user_header_record())
                .record(6, contra_record())
                .record(6, instruction_record())
                .record(7, header1_record(RowKind::Eof1))
                .record(8, header2_record(RowKind::Eof2))
                .record(9, user_trailer_record()),
        )
}

fn type_rid(kind: RowKind) -> FieldSpec {
    FieldSpec::rid(TYPE, 0, 4, IdentifyRule::Literal(kind.name().to_string()))
}

fn julian(name: &str, offset: usize) -> FieldSpec {
    FieldSpec::new(name, offset, 6)
        .with_trim()
        .with_handler(HandlerRef::JulianDate)
}

fn volume_record() -> RecordSchema {
    RecordSchema::new(RowKind::Vol1)
        .with_occurs(Occurs::optional())
        .field(type_rid(RowKind::Vol1))
        .field(FieldSpec::new(SERIAL_NO, 4, 6))
        .field(FieldSpec::new(ACCESSIBILITY, 40, 1))
        .field(FieldSpec::new(USER_NUMBER, 41, 6))
        .field(FieldSpec::new(LABEL, 79, 1))
}

fn header1_record(kind: RowKind) -> RecordSchema {
    RecordSchema::new(kind)
        .with_occurs(Occurs::once())
        .field(type_rid(kind))
        .field(FieldSpec::new(FILE, 4, 17))
        .field(FieldSpec::new(SET, 21, 6))
        .field(FieldSpec::new(SECTION, 27, 4))
        .field(FieldSpec::new(SEQUENCE, 31, 4))
        .field(FieldSpec::new(GENERATION, 35, 4))
        .field(FieldSpec::new(VERSION, 39, 2))
        .field(julian(CREATED, 41).optional())
        .field(julian(EXPIRES, 47).optional())
        .field(FieldSpec::new(ACCESSIBILITY, 53, 1))
        .field(FieldSpec::new(BLOCK_COUNT, 54, 6))
        .field(FieldSpec::new(SYSTEM_CODE, 60, 13))
}

fn header2_record(kind: RowKind) -> RecordSchema {
    RecordSchema::new(kind)
        .with_occurs(Occurs::once())
        .field(type_rid(kind))
        .field(FieldSpec::new(FORMAT, 4, 1))
        .field(FieldSpec::new(BLOCK, 5, 5))
        .field(FieldSpec::new(RECORD, 10, 5))
        .field(FieldSpec::new(OFFSET, 50, 2))
}

fn user_header_record() -> RecordSchema {
    RecordSchema::new(RowKind::Uhl1)
        .with_occurs(Occurs::once())
        .field(type_rid(RowKind::Uhl1))
        .field(julian(PROCESSING_DATE, 4))
        .field(FieldSpec::new(DEST, 10, 10))
        .field(FieldSpec::new(CURRENCY, 20, 2))
        .field(FieldSpec::new(COUNTRY, 22, 6))
        .field(FieldSpec::new(WORK_CODE, 28, 9))
        .field(FieldSpec::new(FILE, 37, 3))
        .field(FieldSpec::new(AUDIT, 47, 7))
}

fn user_trailer_record() -> RecordSchema {
    let pence = |name: &str, offset: usize| {
        FieldSpec::new(name, offset, 13)
            .with_trim()
            .with_handler(HandlerRef::Pence)
    };

    RecordSchema::new(RowKind::Utl1)
        .with_occurs(Occurs::once())
        .field(type_rid(RowKind::Utl1))
        .field(pence(DEBIT_VALUE, 4))
        .field(pence(CREDIT_VALUE, 17))
        .field(FieldSpec::new(DEBIT_COUNT, 30, 7))
        .field(FieldSpec::new(CREDIT_COUNT, 37, 7))
        .field(FieldSpec::new(DDI_COUNT, 52, 7))
        .field(FieldSpec::new(SERVICE_USER, 59, 21))
}

fn payment_record(kind: RowKind) -> RecordSchema {
    RecordSchema::new(kind)
        .with_length_range(PAYMENT_MIN_LENGTH, PAYMENT_MAX_LENGTH)
        .with_occurs(Occurs::any())
}

fn payment_tail(record: RecordSchema) -> RecordSchema {
    record
        .field(FieldSpec::new(TRANSACTION_TYPE, 15, 2))
        .field(FieldSpec::new(AMOUNT, 35, 11).with_handler(HandlerRef::Pence))
        .field(
            FieldSpec::new(PROCESSING_DATE, 100, 6)
                .with_handler(HandlerRef::JulianDate)
                .optional(),
        )
}

fn contra_record() -> RecordSchema {
    payment_tail(payment_record(RowKind::Contra))
        .field(FieldSpec::rid(
            CONTRA,
            64,
            6,
            IdentifyRule::Literal(RowKind::Contra.name().to_string()),
        ))
        .segment(
            SegmentSpec::new(DESTINATION)
                .field(FieldSpec::new(SORT_CODE, 0, 6))
                .field(FieldSpec::new(NUMBER, 6, 8))
                .field(FieldSpec::new(TYPE, 14, 1)),
        )
        .segment(
            SegmentSpec::new(ORIGIN)
                .field(FieldSpec::new(SORT_CODE, 17, 6))
                .field(FieldSpec::new(NUMBER, 23, 8))
                .field(FieldSpec::new(NAME, 82, 18)),
        )
        .field(FieldSpec::new(FREE_FORMAT, 31, 4))
        .field(FieldSpec::new(NARRATIVE, 46, 18))
}

fn instruction_record() -> RecordSchema {
    payment_tail(payment_record(RowKind::Instr))
        .field(FieldSpec::rid(
            TYPE,
            0,
            4,
            IdentifyRule::Pattern(INSTRUCTION_PREFIX.clone()),
        ))
        .field(FieldSpec::rid(
            CONTRA,
            0,
            6,
            IdentifyRule::Absent(RowKind::Contra.name().to_string()),
        ))
        .segment(
            SegmentSpec::new(DESTINATION)
                .field(FieldSpec::new(SORT_CODE, 0, 6))
                .field(FieldSpec::new(NUMBER, 6, 8))
                .field(FieldSpec::new(NAME, 82, 18))
                .field(FieldSpec::new(TYPE, 14, 1)),
        )
        .segment(
            SegmentSpec::new(ORIGIN)
                .field(FieldSpec::new(SORT_CODE, 17, 6))
                .field(FieldSpec::new(NUMBER, 23, 8))
                .field(FieldSpec::new(NAME, 46, 18)),
        )
        .field(FieldSpec::new(RTI, 31, 4))
        .field(FieldSpec::new(REFERENCE, 64, 18))
}
