//! Group schemas: ordered, repeating collections of records and groups.

use std::collections::HashSet;

use super::record::{Occurs, RecordSchema};
use crate::error::{BacsError, Result};
use crate::models::row::RowKind;

/// A record or nested group inside a group.
#[derive(Debug, Clone)]
pub enum Member {
    Record(RecordSchema),
    Group(GroupSchema),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Record(record) => record.name(),
            Member::Group(group) => &group.name,
        }
    }

    pub fn occurs(&self) -> Occurs {
        match self {
            Member::Record(record) => record.occurs,
            Member::Group(group) => group.occurs,
        }
    }
}

/// A member together with its relative order index.
///
/// Members sharing an order index are alternatives that may interleave.
#[derive(Debug, Clone)]
pub struct GroupMember {
    pub order: u32,
    pub member: Member,
}

/// An ordered collection of record schemas forming one structural unit.
#[derive(Debug, Clone)]
pub struct GroupSchema {
    pub name: String,
    pub occurs: Occurs,
    members: Vec<GroupMember>,
}

impl GroupSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            occurs: Occurs::optional(),
            members: Vec::new(),
        }
    }

    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    pub fn record(self, order: u32, record: RecordSchema) -> Self {
        self.member(order, Member::Record(record))
    }

    pub fn group(self, order: u32, group: GroupSchema) -> Self {
        self.member(order, Member::Group(group))
    }

    // Kept sorted by order; declaration order breaks ties.
    fn member(mut self, order: u32, member: Member) -> Self {
        let at = self.members.partition_point(|m| m.order <= order);
        self.members.insert(at, GroupMember { order, member });
        self
    }

    /// Members in classification order.
    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Record kinds in the order lines are tried against them.
    pub fn classification_order(&self) -> Vec<RowKind> {
        let mut kinds = Vec::new();
        for m in &self.members {
            match &m.member {
                Member::Record(record) => kinds.push(record.kind),
                Member::Group(group) => kinds.extend(group.classification_order()),
            }
        }
        kinds
    }

    /// Find a record schema by kind anywhere in the group tree.
    pub fn find(&self, kind: RowKind) -> Option<&RecordSchema> {
        self.members.iter().find_map(|m| match &m.member {
            Member::Record(record) if record.kind == kind => Some(record),
            Member::Record(_) => None,
            Member::Group(group) => group.find(kind),
        })
    }

    /// Validate this group, its records and nested groups.
    pub fn validate(&self) -> Result<()> {
        if self.occurs.max.is_some_and(|max| max < self.occurs.min) {
            return Err(BacsError::Schema {
                schema: self.name.clone(),
                reason: format!("invalid occurrence bounds {}", self.occurs),
            });
        }
        if self.members.is_empty() {
            return Err(BacsError::Schema {
                schema: self.name.clone(),
                reason: "group has no members".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for kind in self.classification_order() {
            if !seen.insert(kind) {
                return Err(BacsError::Schema {
                    schema: self.name.clone(),
                    reason: format!("record {kind} declared twice"),
                });
            }
        }

        for m in &self.members {
            match &m.member {
                Member::Record(record) => record.validate()?,
                Member::Group(group) => group.validate()?,
            }
        }
        Ok(())
    }
}
