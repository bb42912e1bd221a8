//! Runs compiled queries over trees.
//!
//! [`QueryCursor`] holds the execution limits; [`QueryCursor::matches`]
//! returns a lazy iterator that walks the tree only as far as needed to
//! produce the next match.

mod state;


use std::ops::Range;

use treehouse_core::{Node, Point};

use crate::Query;
use state::{Limits, MatchState};

/// A node bound to a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'tree> {
    pub node: Node<'tree>,
    pub index: u32,
}

/// One successful instantiation of a pattern.
///
/// Captures are ordered as they were bound: a step's own captures before
/// those of its children, children left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'tree> {
    pub pattern_index: usize,
    pub captures: Vec<QueryCapture<'tree>>,
}

impl<'tree> QueryMatch<'tree> {
    pub fn nodes_for_capture_index(&self, index: u32) -> impl Iterator<Item = Node<'tree>> + '_ {
        self.captures
            .iter()
            .filter(move |capture| capture.index == index)
            .map(|capture| capture.node)
    }
}

/// Execution state for running queries.
///
/// A cursor can be reused across queries and trees; each call to
/// [`matches`](Self::matches) starts a fresh run with the current settings.
#[derive(Debug, Clone)]
pub struct QueryCursor {
    limits: Limits,
    did_exceed_match_limit: bool,
}

impl Default for QueryCursor {
    fn default() -> Self {
        Self {
            limits: Limits {
                match_limit: u32::MAX,
                byte_range: 0..usize::MAX,
                point_range: Point::new(0, 0)..Point::new(usize::MAX, usize::MAX),
                max_start_depth: u32::MAX,
            },
            did_exceed_match_limit: false,
        }
    }
}

impl QueryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of partial matches tracked at once.
    pub fn match_limit(&self) -> u32 {
        self.limits.match_limit
    }

    pub fn set_match_limit(&mut self, limit: u32) -> &mut Self {
        self.limits.match_limit = limit;
        self
    }

    /// Whether the last run dropped a partial match to stay under the limit.
    pub fn did_exceed_match_limit(&self) -> bool {
        self.did_exceed_match_limit
    }

    /// Only start matches at nodes intersecting `range`.
    pub fn set_byte_range(&mut self, range: Range<usize>) -> &mut Self {
        self.limits.byte_range = range;
        self
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.limits.byte_range.clone()
    }

    /// Only start matches at nodes intersecting `range`.
    pub fn set_point_range(&mut self, range: Range<Point>) -> &mut Self {
        self.limits.point_range = range;
        self
    }

    pub fn point_range(&self) -> Range<Point> {
        self.limits.point_range.clone()
    }

    /// Only start matches at most `depth` levels below the search root.
    /// `None` removes the limit.
    pub fn set_max_start_depth(&mut self, depth: Option<u32>) -> &mut Self {
        self.limits.max_start_depth = depth.unwrap_or(u32::MAX);
        self
    }

    /// Matches of `query` within the subtree of `node`, in pre-order of the
    /// matched node, ties broken by pattern index.
    ///
    /// `source` is the text the tree was parsed from; text predicates read it.
    pub fn matches<'a, 'tree>(
        &'a mut self,
        query: &'a Query,
        node: Node<'tree>,
        source: &'a [u8],
    ) -> QueryMatches<'a, 'tree> {
        self.did_exceed_match_limit = false;
        let state = MatchState::new(query, node, source, self.limits.clone());
        QueryMatches {
            cursor: self,
            state,
        }
    }

    /// Like [`matches`](Self::matches), yielding each capture of each match
    /// along with its position in the match, ordered by start byte within
    /// the match.
    pub fn captures<'a, 'tree>(
        &'a mut self,
        query: &'a Query,
        node: Node<'tree>,
        source: &'a [u8],
    ) -> QueryCaptures<'a, 'tree> {
        QueryCaptures {
            matches: self.matches(query, node, source),
            current: None,
            next: 0,
        }
    }
}

/// Lazy iterator over the matches of a query.
pub struct QueryMatches<'a, 'tree> {
    cursor: &'a mut QueryCursor,
    state: MatchState<'a, 'tree>,
}

impl<'tree> Iterator for QueryMatches<'_, 'tree> {
    type Item = QueryMatch<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.state.next_match();
        self.cursor.did_exceed_match_limit |= self.state.exceeded();
        next
    }
}

/// Lazy iterator over `(match, capture position)` pairs.
pub struct QueryCaptures<'a, 'tree> {
    matches: QueryMatches<'a, 'tree>,
    current: Option<(QueryMatch<'tree>, Vec<usize>)>,
    next: usize,
}

impl<'tree> Iterator for QueryCaptures<'_, 'tree> {
    type Item = (QueryMatch<'tree>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((current, order)) = &self.current
                && let Some(&position) = order.get(self.next)
            {
                self.next += 1;
                return Some((current.clone(), position));
            }

            let found = self.matches.next()?;
            let mut order: Vec<usize> = (0..found.captures.len()).collect();
            order.sort_by_key(|&i| found.captures[i].node.start_byte());
            self.current = Some((found, order));
            self.next = 0;
        }
    }
}
