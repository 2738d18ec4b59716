//! Callback registry driving the stream dispatcher.
//!
//! A [`Standard18Mapper`] owns one handler per [`RowKind`]. [`run`] reads a
//! whole input, builds the entity of every record in line order and hands
//! it to the handler registered for its kind. Records without a handler are
//! still classified, extracted and built, then skipped.
//!
//! ```no_run
//! use std::cell::RefCell;
//! use bacs_core::{Entity, Flow, RowKind, Standard18Mapper};
//!
//! let contras = RefCell::new(Vec::new());
//! let mut mapper = Standard18Mapper::new();
//! mapper.register(RowKind::Contra, |_, entity| {
//!     if let Entity::Contra(contra) = entity {
//!         contras.borrow_mut().push(contra);
//!     }
//!     Flow::Continue
//! });
//! mapper.run(std::io::stdin().lock())?;
//! # Ok::<(), bacs_core::BacsError>(())
//! ```
//!
//! [`run`]: Standard18Mapper::run

use std::collections::HashMap;
use std::io::BufRead;

use tracing::{debug, info};

use crate::dispatch::{RecordReader, StreamReader};
use crate::error::{BacsError, Result};
use crate::models::entity::Entity;
use crate::models::row::RowKind;
use crate::schema::GroupSchema;
use crate::standard18;

/// Handler verdict: keep consuming input or stop after this record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

type Handler<'a> = Box<dyn FnMut(RowKind, Entity) -> Flow + 'a>;

/// Standard 18 engine: schema plus a handler per record kind.
///
/// Each instance is independent; parse files in parallel by giving each
/// its own mapper.
#[derive(Default)]
pub struct Standard18Mapper<'a> {
    handlers: HashMap<RowKind, Handler<'a>>,
}

impl<'a> Standard18Mapper<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: RowKind, handler: F) -> &mut Self
    where
        F: FnMut(RowKind, Entity) -> Flow + 'a,
    {
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            debug!(record = kind.name(), "handler replaced");
        }
        self
    }

    pub fn is_registered(&self, kind: RowKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Assemble the Volume / Batch grammar.
    pub fn build_schema(&self) -> GroupSchema {
        standard18::schema()
    }

    /// Dispatch every record of `input` to the registered handlers.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut reader = StreamReader::new(self.build_schema(), input);
        self.dispatch(&mut reader)
    }

    /// Dispatch every record of `reader`. The reader is closed on return.
    pub fn dispatch(&mut self, reader: &mut impl RecordReader) -> Result<()> {
        info!(handlers = self.handlers.len(), "dispatch started");
        let result = self.drain(reader);
        reader.close();
        match &result {
            Ok(dispatched) => info!(lines = reader.line_number(), dispatched, "dispatch finished"),
            Err(err) => info!(line = reader.line_number(), error = %err, "dispatch aborted"),
        }
        result.map(|_| ())
    }

    fn drain(&mut self, reader: &mut impl RecordReader) -> Result<usize> {
        let mut dispatched = 0;

        while reader.read()? {
            let line = reader.line_number();
            let (Some(kind), Some(values)) = (reader.record_kind(), reader.values()) else {
                return Err(BacsError::IncompleteRecord { line });
            };

            let entity = Entity::build(kind, values, line).map_err(|err| BacsError::Format {
                line,
                record: kind.name().to_string(),
                field: err.field,
                source: err.source,
            })?;

            let Some(handler) = self.handlers.get_mut(&kind) else {
                continue;
            };
            dispatched += 1;
            if handler(kind, entity) == Flow::Stop {
                info!(line, record = kind.name(), "handler requested stop");
                break;
            }
        }

        Ok(dispatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_register_replaces() {
        let mut mapper = Standard18Mapper::new();
        assert!(!mapper.is_registered(RowKind::Vol1));
        mapper
            .register(RowKind::Vol1, |_, _| Flow::Continue)
            .register(RowKind::Vol1, |_, _| Flow::Stop);
        assert!(mapper.is_registered(RowKind::Vol1));
        assert_eq!(mapper.handlers.len(), 1);
    }

    #[test]
    fn test_build_schema_is_repeatable() {
        let mapper = Standard18Mapper::new();
        assert_eq!(
            mapper.build_schema().classification_order(),
            mapper.build_schema().classification_order()
        );
    }

    #[test]
    fn test_empty_input_dispatches_nothing() {
        let calls = RefCell::new(0);
        let mut mapper = Standard18Mapper::new();
        mapper.register(RowKind::Vol1, |_, _| {
            *calls.borrow_mut() += 1;
            Flow::Continue
        });
        mapper.run(std::io::Cursor::new("")).unwrap();
        drop(mapper);
        assert_eq!(calls.into_inner(), 0);
    }

    /// Claims one record but never exposes it.
    struct Hollow {
        read: bool,
        closed: bool,
    }

    impl RecordReader for Hollow {
        fn read(&mut self) -> Result<bool> {
            let first = !self.read;
            self.read = true;
            Ok(first)
        }

        fn record_kind(&self) -> Option<RowKind> {
            None
        }

        fn line_number(&self) -> usize {
            1
        }

        fn values(&self) -> Option<&crate::schema::FieldValues> {
            None
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn test_record_without_values_is_an_error() {
        let mut reader = Hollow { read: false, closed: false };
        let mut mapper = Standard18Mapper::new();
        mapper.register(RowKind::Vol1, |_, _| Flow::Continue);
        let err = mapper.dispatch(&mut reader).unwrap_err();
        assert!(matches!(err, BacsError::IncompleteRecord { line: 1 }));
        assert!(reader.closed);
    }

    #[test]
    fn test_volume_only_file() {
        let seen = RefCell::new(Vec::new());
        let mut mapper = Standard18Mapper::new();
        mapper.register(RowKind::Vol1, |kind, entity| {
            seen.borrow_mut().push((kind, entity));
            Flow::Continue
        });
        let line = format!("{:<80}", "VOL1000001");
        mapper.run(std::io::Cursor::new(line)).unwrap();
        drop(mapper);

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 1);
        let (kind, Entity::Volume(volume)) = &seen[0] else {
            panic!("expected a volume, got {:?}", seen[0]);
        };
        assert_eq!(*kind, RowKind::Vol1);
        assert_eq!(volume.serial_no, "000001");
    }
}
