//! Compiled queries.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use indexmap::IndexSet;
use treehouse_core::{KindId, Language};

use crate::step::{Matcher, Step, StepId};
use crate::{CaptureQuantifier, QueryError, QueryPredicate, TextPredicate, compile, parser};

/// Default limit on how deeply patterns may nest.
///
/// Parsing and compiling recurse once per level; the default keeps that
/// within a 2 MiB thread stack in unoptimized builds.
pub const DEFAULT_NESTING_LIMIT: u32 = 64;

/// Compile-time configuration for [`Query`].
#[derive(Clone, Copy, Debug)]
pub struct QueryBuilder {
    nesting_limit: u32,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            nesting_limit: DEFAULT_NESTING_LIMIT,
        }
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum nesting depth of steps within one pattern.
    pub fn nesting_limit(mut self, limit: u32) -> Self {
        self.nesting_limit = limit;
        self
    }

    pub fn get_nesting_limit(&self) -> u32 {
        self.nesting_limit
    }

    pub fn build(&self, language: &Language, source: &str) -> Result<Query, QueryError> {
        let patterns = parser::parse(source, self.nesting_limit)?;
        let query = compile::compile(language, source, &patterns)?;
        tracing::debug!(
            language = language.name(),
            patterns = query.pattern_count(),
            captures = query.capture_count(),
            steps = query.step_count(),
            "compiled query"
        );
        Ok(query)
    }
}

pub(crate) struct Pattern {
    pub root: StepId,
    pub steps: Range<StepId>,
    pub start_byte: usize,
    pub end_byte: usize,
    pub rooted: bool,
    pub non_local: bool,
    pub capture_quantifiers: Vec<CaptureQuantifier>,
    pub text_predicates: Vec<TextPredicate>,
    pub general_predicates: Vec<QueryPredicate>,
}

/// A compiled set of patterns for one language.
///
/// Patterns are numbered in source order. Capture indices are shared by all
/// patterns and assigned in order of first appearance.
///
/// Methods taking a pattern index panic when it is out of range.
pub struct Query {
    language: Language,
    pub(crate) steps: Vec<Step>,
    pub(crate) patterns: Vec<Pattern>,
    captures: IndexSet<String>,
    guaranteed: Vec<bool>,
    disabled_captures: Vec<bool>,
    disabled_patterns: Vec<bool>,
    starts_by_kind: HashMap<KindId, Vec<u32>>,
    starts_any_kind: Vec<u32>,
}

impl Query {
    /// Compile `source` with the default [`QueryBuilder`].
    pub fn new(language: &Language, source: &str) -> Result<Self, QueryError> {
        QueryBuilder::new().build(language, source)
    }

    pub(crate) fn from_parts(
        language: Language,
        steps: Vec<Step>,
        patterns: Vec<Pattern>,
        captures: IndexSet<String>,
        guaranteed: Vec<bool>,
    ) -> Self {
        let mut starts_by_kind: HashMap<KindId, Vec<u32>> = HashMap::new();
        let mut starts_any_kind = Vec::new();
        for (index, pattern) in patterns.iter().enumerate() {
            match steps[pattern.root as usize].matcher {
                Matcher::Kind(kind) => starts_by_kind.entry(kind).or_default().push(index as u32),
                _ => starts_any_kind.push(index as u32),
            }
        }

        Self {
            language,
            disabled_captures: vec![false; captures.len()],
            disabled_patterns: vec![false; patterns.len()],
            steps,
            patterns,
            captures,
            guaranteed,
            starts_by_kind,
            starts_any_kind,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Byte offset where pattern `index` starts in the query source.
    pub fn start_byte_for_pattern(&self, index: usize) -> usize {
        self.patterns[index].start_byte
    }

    pub fn end_byte_for_pattern(&self, index: usize) -> usize {
        self.patterns[index].end_byte
    }

    pub fn capture_names(&self) -> Vec<&str> {
        self.captures.iter().map(String::as_str).collect()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.captures.get_index_of(name).map(|i| i as u32)
    }

    pub fn capture_name(&self, index: u32) -> Option<&str> {
        self.captures.get_index(index as usize).map(String::as_str)
    }

    /// One quantifier per capture index; `Zero` for captures the pattern
    /// does not mention.
    pub fn capture_quantifiers(&self, index: usize) -> &[CaptureQuantifier] {
        &self.patterns[index].capture_quantifiers
    }

    /// Rooted patterns only match at the node the search starts from.
    pub fn is_pattern_rooted(&self, index: usize) -> bool {
        self.patterns[index].rooted
    }

    /// The pattern's top level is an alternation.
    pub fn is_pattern_non_local(&self, index: usize) -> bool {
        self.patterns[index].non_local
    }

    /// Number of steps across all patterns.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Reaching step `step_index` during a match means the match will be
    /// reported. Steps are numbered in pre-order across all patterns.
    pub fn is_pattern_guaranteed_at_step(&self, step_index: usize) -> bool {
        self.guaranteed.get(step_index).copied().unwrap_or(false)
    }

    pub fn text_predicates(&self, index: usize) -> &[TextPredicate] {
        &self.patterns[index].text_predicates
    }

    pub fn general_predicates(&self, index: usize) -> &[QueryPredicate] {
        &self.patterns[index].general_predicates
    }

    /// Omit `name` from future matches. Unknown names are ignored.
    pub fn disable_capture(&mut self, name: &str) {
        if let Some(index) = self.captures.get_index_of(name) {
            self.disabled_captures[index] = true;
        }
    }

    /// Never report pattern `index` again.
    pub fn disable_pattern(&mut self, index: usize) {
        if let Some(disabled) = self.disabled_patterns.get_mut(index) {
            *disabled = true;
        }
    }

    pub fn is_capture_disabled(&self, index: u32) -> bool {
        self.disabled_captures.get(index as usize).copied().unwrap_or(false)
    }

    pub fn is_pattern_disabled(&self, index: usize) -> bool {
        self.disabled_patterns.get(index).copied().unwrap_or(false)
    }

    /// Enabled patterns whose root could accept a node of `kind`, ascending.
    pub(crate) fn start_candidates(&self, kind: KindId, out: &mut Vec<u32>) {
        out.clear();
        if let Some(patterns) = self.starts_by_kind.get(&kind) {
            out.extend_from_slice(patterns);
        }
        out.extend_from_slice(&self.starts_any_kind);
        out.retain(|&p| !self.disabled_patterns[p as usize]);
        out.sort_unstable();
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("language", &self.language.name())
            .field("patterns", &self.patterns.len())
            .field("captures", &self.captures)
            .finish()
    }
}
