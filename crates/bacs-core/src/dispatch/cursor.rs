//! Grammar position tracking for ordered, bounded group schemas.

use crate::error::{BacsError, Result, StructureViolation};
use crate::schema::{GroupSchema, Member, RecordSchema};

/// Outcome of offering one line to a group cursor.
#[derive(Debug)]
pub(crate) enum Step<'s> {
    /// The line belongs to this record.
    Matched(&'s RecordSchema),
    /// The line matches a record or group already at its upper bound.
    Exhausted { name: String, max: usize },
    /// Nothing at the current position accepts the line.
    NoMatch,
}

/// Position within one instance of a group.
///
/// The cursor holds no reference to its schema; callers pass the same
/// schema on every call.
#[derive(Debug)]
pub(crate) struct GroupCursor {
    /// Order index of the member matched last, `None` before the first match.
    order: Option<u32>,
    counts: Vec<usize>,
    /// Open instance of each nested group member.
    children: Vec<Option<GroupCursor>>,
}

impl GroupCursor {
    pub(crate) fn new(schema: &GroupSchema) -> Self {
        let n = schema.members().len();
        Self {
            order: None,
            counts: vec![0; n],
            children: (0..n).map(|_| None).collect(),
        }
    }

    fn is_candidate(&self, order: u32) -> bool {
        self.order.is_none_or(|current| order >= current)
    }

    /// Offer a line to this group instance.
    pub(crate) fn step<'s>(
        &mut self,
        schema: &'s GroupSchema,
        line: &str,
        line_no: usize,
    ) -> Result<Step<'s>> {
        let mut exhausted: Option<(String, usize)> = None;

        for (i, gm) in schema.members().iter().enumerate() {
            if !self.is_candidate(gm.order) {
                continue;
            }

            match &gm.member {
                Member::Record(record) => {
                    if !record.matches(line) {
                        continue;
                    }
                    if !record.occurs.allows(self.counts[i] + 1) {
                        exhausted.get_or_insert((record.name().to_string(), record.occurs.max.unwrap_or(0)));
                        continue;
                    }
                    self.enter(schema, gm.order, line_no)?;
                    self.counts[i] += 1;
                    return Ok(Step::Matched(record));
                }
                Member::Group(group) => {
                    if let Some(child) = self.children[i].as_mut() {
                        match child.step(group, line, line_no)? {
                            Step::Matched(record) => return Ok(Step::Matched(record)),
                            Step::Exhausted { name, max } => {
                                exhausted.get_or_insert((name, max));
                            }
                            Step::NoMatch => {}
                        }
                    }

                    // A new instance opens only at its first required member.
                    let mut fresh = GroupCursor::new(group);
                    let started = match fresh.step(group, line, line_no) {
                        Ok(step) => step,
                        Err(BacsError::Structure {
                            violation: StructureViolation::Missing { .. },
                            ..
                        }) => Step::NoMatch,
                        Err(err) => {
                            return Err(match exhausted {
                                Some((name, max)) => too_many(line_no, name, max),
                                None => err,
                            });
                        }
                    };

                    match started {
                        Step::Matched(record) => {
                            if !group.occurs.allows(self.counts[i] + 1) {
                                exhausted.get_or_insert((group.name.clone(), group.occurs.max.unwrap_or(0)));
                                continue;
                            }
                            if let Some(previous) = &self.children[i] {
                                previous.check_complete(group, Some(line_no))?;
                            }
                            self.enter(schema, gm.order, line_no)?;
                            self.counts[i] += 1;
                            self.children[i] = Some(fresh);
                            return Ok(Step::Matched(record));
                        }
                        Step::Exhausted { name, max } => {
                            exhausted.get_or_insert((name, max));
                        }
                        Step::NoMatch => {}
                    }
                }
            }
        }

        Ok(match exhausted {
            Some((name, max)) => Step::Exhausted { name, max },
            None => Step::NoMatch,
        })
    }

    /// Move to `order`, checking the bounds of every member passed over.
    fn enter(&mut self, schema: &GroupSchema, order: u32, line_no: usize) -> Result<()> {
        let advancing = self.order.is_none_or(|current| order > current);
        if advancing {
            for (j, gm) in schema.members().iter().enumerate() {
                let passed = gm.order < order && self.is_candidate(gm.order);
                if passed {
                    self.check_member(schema, j, Some(line_no))?;
                }
            }
        }
        self.order = Some(order);
        Ok(())
    }

    fn check_member(&self, schema: &GroupSchema, j: usize, line: Option<usize>) -> Result<()> {
        let gm = &schema.members()[j];
        let occurs = gm.member.occurs();
        if !occurs.is_satisfied(self.counts[j]) {
            return Err(BacsError::Structure {
                line,
                violation: StructureViolation::Missing {
                    name: gm.member.name().to_string(),
                    min: occurs.min,
                    found: self.counts[j],
                },
            });
        }
        if let (Member::Group(group), Some(child)) = (&gm.member, &self.children[j]) {
            child.check_complete(group, line)?;
        }
        Ok(())
    }

    /// Verify every member of this instance reached its lower bound.
    pub(crate) fn check_complete(&self, schema: &GroupSchema, line: Option<usize>) -> Result<()> {
        (0..schema.members().len()).try_for_each(|j| self.check_member(schema, j, line))
    }
}

pub(crate) fn too_many(line_no: usize, name: String, max: usize) -> BacsError {
    BacsError::Structure {
        line: Some(line_no),
        violation: StructureViolation::TooMany { name, max },
    }
}
