//! Predicates attached to patterns.
//!
//! Text predicates filter matches by the source text of captured nodes.
//! Anything else is kept verbatim as a [`QueryPredicate`] for the caller to
//! interpret; those never affect matching.

use regex_automata::meta::Regex;

use crate::QueryCapture;

/// A predicate the engine evaluates before reporting a match.
///
/// `match_all` variants require every node of a quantified capture to pass;
/// the `any-` forms need only one. `positive` is false for the `not-` forms.
#[derive(Debug, Clone)]
pub enum TextPredicate {
    /// `#eq? @capture "text"`
    EqString {
        capture: u32,
        value: Box<str>,
        positive: bool,
        match_all: bool,
    },
    /// `#eq? @capture @other`, compared pairwise in capture order.
    EqCapture {
        capture: u32,
        other: u32,
        positive: bool,
        match_all: bool,
    },
    /// `#match? @capture "regex"`
    MatchString {
        capture: u32,
        regex: Regex,
        positive: bool,
        match_all: bool,
    },
    /// `#any-of? @capture "a" "b" ...`
    AnyString {
        capture: u32,
        values: Vec<Box<str>>,
        positive: bool,
    },
}

/// A predicate with an operator the engine does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPredicate {
    /// Operator without the leading `#`, e.g. `set!`.
    pub operator: Box<str>,
    pub args: Vec<QueryPredicateArg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPredicateArg {
    Capture(u32),
    String(Box<str>),
}

impl TextPredicate {
    pub(crate) fn satisfied(&self, captures: &[QueryCapture<'_>], source: &[u8]) -> bool {
        let texts = |index: u32| {
            captures
                .iter()
                .filter(move |c| c.index == index)
                .map(|c| c.node.byte_text(source))
        };

        match self {
            Self::EqString {
                capture,
                value,
                positive,
                match_all,
            } => {
                let pass = |text: &[u8]| (text == value.as_bytes()) == *positive;
                if *match_all {
                    texts(*capture).all(pass)
                } else {
                    texts(*capture).any(pass)
                }
            }
            Self::EqCapture {
                capture,
                other,
                positive,
                match_all,
            } => {
                let mut left = texts(*capture);
                let mut right = texts(*other);
                loop {
                    match (left.next(), right.next()) {
                        (Some(a), Some(b)) => {
                            let pass = (a == b) == *positive;
                            if *match_all && !pass {
                                return false;
                            }
                            if !*match_all && pass {
                                return true;
                            }
                        }
                        (None, None) => return *match_all,
                        _ => return false,
                    }
                }
            }
            Self::MatchString {
                capture,
                regex,
                positive,
                match_all,
            } => {
                let pass = |text: &[u8]| regex.is_match(text) == *positive;
                if *match_all {
                    texts(*capture).all(pass)
                } else {
                    texts(*capture).any(pass)
                }
            }
            Self::AnyString {
                capture,
                values,
                positive,
            } => texts(*capture).all(|text| {
                values.iter().any(|value| value.as_bytes() == text) == *positive
            }),
        }
    }

    /// Capture the predicate tests.
    pub fn capture(&self) -> u32 {
        match self {
            Self::EqString { capture, .. }
            | Self::EqCapture { capture, .. }
            | Self::MatchString { capture, .. }
            | Self::AnyString { capture, .. } => *capture,
        }
    }
}
