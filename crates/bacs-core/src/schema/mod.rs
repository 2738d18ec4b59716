//! Declarative fixed-width schema model.
//!
//! A [`GroupSchema`] is an ordered grammar of [`RecordSchema`]s (and nested
//! groups) with occurrence bounds. Each record describes one physical line
//! shape: its allowed length, the [`FieldSpec`]s that identify it, and the
//! fields and [`SegmentSpec`]s whose values are extracted.

pub mod field;
pub mod group;
pub mod record;
pub mod segment;
pub mod values;

pub use field::{FieldError, FieldSpec, IdentifyRule};
pub use group::{GroupMember, GroupSchema, Member};
pub use record::{Occurs, RecordSchema};
pub use segment::SegmentSpec;
pub use values::FieldValues;
