//! Capture quantifiers and their algebra.
//!
//! A quantifier is a bound on how many nodes a capture can collect in one
//! match, modelled as `(min, max)` with `min` in `{0, 1}` and `max` in
//! `{0, 1, many}`.

use std::fmt;

/// How many nodes a step (or a capture) may match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CaptureQuantifier {
    /// Capture absent from the pattern.
    Zero,
    ZeroOrOne,
    ZeroOrMore,
    #[default]
    One,
    OneOrMore,
}

const MANY: u8 = 2;

impl CaptureQuantifier {
    fn bounds(self) -> (u8, u8) {
        match self {
            Self::Zero => (0, 0),
            Self::ZeroOrOne => (0, 1),
            Self::ZeroOrMore => (0, MANY),
            Self::One => (1, 1),
            Self::OneOrMore => (1, MANY),
        }
    }

    fn from_bounds(min: u8, max: u8) -> Self {
        match (min.min(1), max.min(MANY)) {
            (_, 0) => Self::Zero,
            (0, 1) => Self::ZeroOrOne,
            (0, _) => Self::ZeroOrMore,
            (_, 1) => Self::One,
            _ => Self::OneOrMore,
        }
    }

    /// May match zero times.
    pub fn is_optional(self) -> bool {
        self.bounds().0 == 0
    }

    /// May match more than once.
    pub fn is_repeating(self) -> bool {
        self.bounds().1 == MANY
    }

    /// Either of two alternatives.
    pub fn join(self, other: Self) -> Self {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        Self::from_bounds(a_min.min(b_min), a_max.max(b_max))
    }

    /// Both occurrences, one after the other.
    pub fn add(self, other: Self) -> Self {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        Self::from_bounds(a_min + b_min, a_max + b_max)
    }

    /// `self` nested under a step quantified by `outer`.
    pub fn mul(self, outer: Self) -> Self {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = outer.bounds();
        Self::from_bounds(a_min * b_min, a_max * b_max)
    }
}

impl fmt::Display for CaptureQuantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zero => "",
            Self::ZeroOrOne => "?",
            Self::ZeroOrMore => "*",
            Self::One => "",
            Self::OneOrMore => "+",
        })
    }
}
