//! Unresolved pattern tree produced by the parser.
//!
//! Names are still text here; the compiler resolves them against a
//! `Language` and reports unknown ones at the spans kept below.

use rowan::TextRange;

use crate::CaptureQuantifier;

/// Text from the query plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Name {
    pub text: String,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern {
    pub rooted: bool,
    pub root: Step,
    pub predicates: Vec<Predicate>,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StepKind {
    /// `(kind ...)`
    Named(Name),
    /// `"text"`
    Literal(Name),
    /// bare `_`
    Wildcard,
    /// `(_ ...)`
    NamedWildcard,
    /// `(ERROR ...)`
    Error,
    /// `(MISSING)`, `(MISSING kind)`, `(MISSING "text")`
    Missing(Option<MissingTarget>),
    /// `[a b ...]`
    Alternation(Vec<Step>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MissingTarget {
    pub name: Name,
    pub named: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub kind: StepKind,
    pub field: Option<Name>,
    pub negated_fields: Vec<Name>,
    pub children: Vec<Child>,
    /// `.` after the last child.
    pub anchor_last: bool,
    pub quantifier: CaptureQuantifier,
    pub captures: Vec<Name>,
    pub span: TextRange,
}

impl Step {
    pub fn new(kind: StepKind, span: TextRange) -> Self {
        Self {
            kind,
            field: None,
            negated_fields: Vec::new(),
            children: Vec::new(),
            anchor_last: false,
            quantifier: CaptureQuantifier::One,
            captures: Vec::new(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Child {
    /// `.` right before this child.
    pub anchored: bool,
    pub step: Step,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Predicate {
    /// Operator without the leading `#`, e.g. `eq?`.
    pub name: Name,
    pub args: Vec<PredicateArg>,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PredicateArg {
    /// `@name`, stored without the `@`.
    Capture(Name),
    /// String literal or bare identifier.
    String(Name),
}
