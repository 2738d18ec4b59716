//! Data models: record kinds, entities, codes, configuration.

pub mod collector;
pub mod config;
pub mod entity;
pub mod row;
pub mod service_user;
pub mod transaction;

pub use collector::{Batch, BatchTotals, Payment, Std18File};
pub use config::{BacsConfig, OutputConfig, OutputFormat, ParseConfig, UploadConfig};
pub use entity::{
    Account, Contra, Entity, Header1, Header2, Instruction, UserHeader, UserTrailer, Volume,
};
pub use row::RowKind;
pub use service_user::ServiceUser;
pub use transaction::{AuddisCode, CodeTable, CreditCode, DebitCode, TransactionCode, UnknownCode};
