//! Compiled pattern steps.
//!
//! Steps of all patterns live in one flat vector in pre-order. A step
//! refers to its children through `slots` and to alternation branches
//! through its matcher, both by index.

use treehouse_core::{FieldId, KindId, Node};

use crate::CaptureQuantifier;

pub(crate) type StepId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Matcher {
    /// Exact kind: named kinds, anonymous literals and `ERROR`.
    Kind(KindId),
    /// `_`
    Any,
    /// `(_)`
    AnyNamed,
    Missing(Option<KindId>),
    /// First branch that matches wins.
    Alternation(Vec<StepId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub step: StepId,
    /// No named sibling may sit between this child and the previous one.
    pub anchored: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub parent: Option<StepId>,
    pub matcher: Matcher,
    pub quantifier: CaptureQuantifier,
    pub field: Option<FieldId>,
    pub negated_fields: Vec<FieldId>,
    pub captures: Vec<u32>,
    pub slots: Vec<Slot>,
    /// No named child may follow the last matched child.
    pub anchor_last: bool,
    /// This step or one of its ancestors may match zero times.
    pub optional: bool,
}

impl Step {
    /// Checks that need only `node` itself, not its children.
    ///
    /// Alternations defer the kind check to their branches.
    pub fn accepts(&self, node: Node<'_>) -> bool {
        let kind = match &self.matcher {
            Matcher::Kind(kind) => node.kind_id() == *kind,
            Matcher::Any | Matcher::Alternation(_) => true,
            Matcher::AnyNamed => node.is_named(),
            Matcher::Missing(kind) => node.is_missing() && kind.is_none_or(|k| node.kind_id() == k),
        };

        kind && self.field.is_none_or(|field| node.field_id() == Some(field))
            && self
                .negated_fields
                .iter()
                .all(|&field| node.child_by_field_id(field).is_none())
    }

    pub fn branches(&self) -> &[StepId] {
        match &self.matcher {
            Matcher::Alternation(branches) => branches,
            _ => &[],
        }
    }
}
