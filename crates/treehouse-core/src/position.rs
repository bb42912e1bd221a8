//! Source positions.
//!
//! Rows and columns are 0-indexed; columns count bytes, not characters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A row/column position in source text.
///
/// Ordering is lexicographic: row first, then column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Position of `byte` within `source`, counting `\n` as the row separator.
    ///
    /// Offsets past the end clamp to the end of `source`.
    pub fn for_byte(source: &[u8], byte: usize) -> Self {
        let prefix = &source[..byte.min(source.len())];
        match prefix.iter().rposition(|&b| b == b'\n') {
            Some(newline) => Self {
                row: prefix.iter().filter(|&&b| b == b'\n').count(),
                column: prefix.len() - newline - 1,
            },
            None => Self {
                row: 0,
                column: prefix.len(),
            },
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Byte and point extent of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Range {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_point: Point,
    pub end_point: Point,
}

impl Range {
    pub const fn new(start_byte: usize, end_byte: usize, start_point: Point, end_point: Point) -> Self {
        Self {
            start_byte,
            end_byte,
            start_point,
            end_point,
        }
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte..self.end_byte
    }

    /// Whether the byte extents overlap or touch an empty range at a shared boundary.
    pub fn intersects_bytes(&self, range: &std::ops::Range<usize>) -> bool {
        (self.start_byte < range.end && range.start < self.end_byte)
            || (self.start_byte == self.end_byte && range.contains(&self.start_byte))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}..{})", self.start_point, self.end_point)
    }
}
