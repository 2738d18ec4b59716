//! Core library for BACS Standard 18 payment files.
//!
//! This crate provides:
//! - Type handlers for banking Julian dates and whole-pence amounts
//! - A declarative fixed-width schema model (fields, segments, records, groups)
//! - The Standard 18 Volume / Batch layout
//! - A stream dispatcher classifying lines and enforcing occurrence bounds
//! - A callback registry delivering built entities in line order
//! - File-level collection and control-total verification

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod mapper;
pub mod models;
pub mod schema;
pub mod standard18;

pub use codec::{HandlerRef, TypeHandler, Value};
pub use dispatch::{RecordReader, StreamReader};
pub use error::{BacsError, CodecError, Result, StructureViolation};
pub use mapper::{Flow, Standard18Mapper};
pub use models::{
    BacsConfig, Batch, Entity, Payment, RowKind, ServiceUser, Std18File, TransactionCode,
};
pub use schema::{FieldSpec, FieldValues, GroupSchema, RecordSchema};
