//! Incremental matcher.
//!
//! The tree is walked in pre-order. Every node on the current path owns a
//! [`Level`] holding the frames that try to match some step against that
//! node. A frame is a priority-ordered list of threads over the step's
//! child slots; threads advance each time the walk leaves one of the node's
//! direct children. Frames for the children of a node are spawned on entry,
//! only for the steps some live thread could consume next.
//!
//! A step matched against a node yields every distinct capture combination
//! its accepting threads reached, minus combinations contained in another
//! one. Threads whose captures are contained in those of a thread at the
//! same position are pruned as they appear, so repetitions stay linear.
//!
//! A pattern instantiation in flight is a [`Root`] on the level of the node
//! it started at. Finished matches wait in `finished` until no earlier root
//! is still in flight, which keeps the output in (node, pattern) order.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use indexmap::IndexMap;
use treehouse_core::{Node, Point, TreeCursor};

use super::{QueryCapture, QueryMatch};
use crate::Query;
use crate::step::{Matcher, Step, StepId};

#[derive(Debug, Clone)]
pub(super) struct Limits {
    pub match_limit: u32,
    pub byte_range: Range<usize>,
    pub point_range: Range<Point>,
    pub max_start_depth: u32,
}

impl Limits {
    fn intersects(&self, node: Node<'_>) -> bool {
        intersects(node.start_byte(), node.end_byte(), &self.byte_range)
            && intersects(node.start_position(), node.end_position(), &self.point_range)
    }

    /// Descendants of `node` could still intersect the ranges.
    fn may_contain(&self, node: Node<'_>) -> bool {
        node.end_byte() >= self.byte_range.start
            && node.start_byte() <= self.byte_range.end
            && node.end_position() >= self.point_range.start
            && node.start_position() <= self.point_range.end
    }
}

/// Overlap test where empty extents count when they sit inside the range
/// and an empty range selects the nodes spanning its position.
fn intersects<T: Ord + Copy>(start: T, end: T, range: &Range<T>) -> bool {
    if range.start == range.end {
        return start <= range.start && range.start <= end;
    }
    if start == end {
        return range.start <= start && start < range.end;
    }
    start < range.end && end > range.start
}

#[derive(Debug, Clone)]
struct Thread<'tree> {
    /// Next slot to fill; equal to the slot count once all are passed.
    slot: u32,
    /// The slot at `slot` already matched its minimum.
    satisfied: bool,
    /// A named child was skipped since the last consumed one.
    skipped_named: bool,
    captures: Vec<QueryCapture<'tree>>,
}

impl Thread<'_> {
    fn start() -> Self {
        Self {
            slot: 0,
            satisfied: false,
            skipped_named: false,
            captures: Vec::new(),
        }
    }

    /// Every continuation of `other` is open to `self` with at least the
    /// same captures.
    fn covers(&self, other: &Self) -> bool {
        self.slot == other.slot
            && self.satisfied == other.satisfied
            && (!self.skipped_named || other.skipped_named)
            && contains(&self.captures, &other.captures)
    }
}

/// Capture combinations of one step matched against one node.
type Alternatives<'tree> = Vec<Vec<QueryCapture<'tree>>>;

#[derive(Debug)]
struct Frame<'tree> {
    threads: Vec<Thread<'tree>>,
}

#[derive(Debug, Clone, Copy)]
struct Root {
    pattern: u32,
    step: StepId,
}

struct Level<'tree> {
    node: Node<'tree>,
    frames: IndexMap<StepId, Frame<'tree>>,
    roots: Vec<Root>,
}

pub(super) struct MatchState<'a, 'tree> {
    query: &'a Query,
    source: &'a [u8],
    limits: Limits,
    cursor: TreeCursor<'tree>,
    descending: bool,
    done: bool,
    levels: Vec<Level<'tree>>,
    in_flight: usize,
    /// Keyed by (start node, pattern, arrival).
    finished: BTreeMap<(usize, u32, u64), QueryMatch<'tree>>,
    arrivals: u64,
    candidates: Vec<u32>,
    exceeded: bool,
}

impl<'a, 'tree> MatchState<'a, 'tree> {
    pub fn new(query: &'a Query, node: Node<'tree>, source: &'a [u8], limits: Limits) -> Self {
        Self {
            query,
            source,
            limits,
            cursor: node.walk(),
            descending: true,
            done: false,
            levels: Vec::new(),
            in_flight: 0,
            finished: BTreeMap::new(),
            arrivals: 0,
            candidates: Vec::new(),
            exceeded: false,
        }
    }

    pub fn exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn next_match(&mut self) -> Option<QueryMatch<'tree>> {
        loop {
            if let Some(found) = self.release() {
                return Some(found);
            }
            if self.done {
                return None;
            }
            self.advance();
        }
    }

    fn release(&mut self) -> Option<QueryMatch<'tree>> {
        let (&(node, pattern, _), _) = self.finished.first_key_value()?;
        if let Some(pending) = self.oldest_in_flight()
            && pending < (node, pattern)
        {
            return None;
        }
        self.finished.pop_first().map(|(_, found)| found)
    }

    fn oldest_in_flight(&self) -> Option<(usize, u32)> {
        self.levels
            .iter()
            .find_map(|level| level.roots.first().map(|root| (level.node.id(), root.pattern)))
    }

    /// One step of the pre-order walk: enter a node or leave one.
    fn advance(&mut self) {
        if self.descending {
            let node = self.cursor.node();
            let depth = self.cursor.depth();
            if self.enter(node, depth) && self.cursor.goto_first_child() {
                return;
            }
            self.descending = false;
            return;
        }

        let node = self.cursor.node();
        self.leave(node);
        if self.cursor.goto_next_sibling() {
            self.descending = true;
        } else if !self.cursor.goto_parent() {
            self.done = true;
        }
    }

    /// Returns whether the walk needs to visit the children of `node`.
    fn enter(&mut self, node: Node<'tree>, depth: u32) -> bool {
        let query = self.query;
        let mut level = Level {
            node,
            frames: IndexMap::new(),
            roots: Vec::new(),
        };

        if let Some(parent) = self.levels.last() {
            let mut wanted = Vec::new();
            let mut positions = Vec::new();
            for (&id, frame) in &parent.frames {
                let step = &query.steps[id as usize];
                for thread in &frame.threads {
                    closure(query, step, thread.slot, thread.satisfied, &mut positions);
                    for &(slot, _) in &positions {
                        if let Some(s) = step.slots.get(slot as usize)
                            && !(s.anchored && thread.skipped_named)
                        {
                            wanted.push(s.step);
                        }
                    }
                }
            }
            wanted.sort_unstable();
            wanted.dedup();
            for id in wanted {
                spawn(query, id, node, &mut level.frames);
            }
        }
        self.levels.push(level);

        if depth <= self.limits.max_start_depth && self.limits.intersects(node) {
            self.start(node, depth);
        }

        let Some(level) = self.levels.last() else {
            return false;
        };
        let needs_children = level.frames.keys().any(|&id| {
            let step = &query.steps[id as usize];
            !step.slots.is_empty() || step.anchor_last
        });
        needs_children || (depth < self.limits.max_start_depth && self.limits.may_contain(node))
    }

    fn start(&mut self, node: Node<'tree>, depth: u32) {
        let query = self.query;
        let mut candidates = std::mem::take(&mut self.candidates);
        query.start_candidates(node.kind_id(), &mut candidates);

        for &pattern in &candidates {
            let info = &query.patterns[pattern as usize];
            if info.rooted && depth > 0 {
                continue;
            }
            let accepted = match self.levels.last_mut() {
                Some(level) => spawn(query, info.root, node, &mut level.frames),
                None => false,
            };
            if !accepted {
                continue;
            }

            self.make_room();
            if self.in_flight >= self.limits.match_limit as usize {
                self.note_exceeded();
                continue;
            }
            if let Some(level) = self.levels.last_mut() {
                level.roots.push(Root {
                    pattern,
                    step: info.root,
                });
                self.in_flight += 1;
                tracing::trace!(pattern, node = node.id(), "partial match started");
            }
        }

        self.candidates = candidates;
    }

    /// Drop the oldest partial matches until one more fits under the limit.
    fn make_room(&mut self) {
        while self.in_flight >= self.limits.match_limit as usize {
            let Some(level) = self.levels.iter_mut().find(|level| !level.roots.is_empty()) else {
                return;
            };
            let dropped = level.roots.remove(0);
            let node = level.node.id();
            self.in_flight -= 1;
            tracing::trace!(pattern = dropped.pattern, node, "partial match dropped at match limit");
            self.note_exceeded();
        }
    }

    fn note_exceeded(&mut self) {
        if !self.exceeded {
            tracing::warn!(
                limit = self.limits.match_limit,
                "query match limit exceeded, dropping partial matches"
            );
        }
        self.exceeded = true;
    }

    fn leave(&mut self, node: Node<'tree>) {
        let Some(level) = self.levels.pop() else {
            return;
        };
        let query = self.query;

        let results: HashMap<StepId, Alternatives<'tree>> = level
            .frames
            .iter()
            .map(|(&id, frame)| (id, finalize(query, id, frame, node)))
            .filter(|(_, alternatives)| !alternatives.is_empty())
            .collect();

        for root in &level.roots {
            self.in_flight -= 1;
            let alternatives = step_result(query, root.step, node, &results);
            if alternatives.is_empty() {
                tracing::trace!(pattern = root.pattern, node = node.id(), "partial match failed");
            }
            for captures in alternatives {
                self.finish(root.pattern, node, captures);
            }
        }

        let Some(parent) = self.levels.last_mut() else {
            return;
        };
        for (&id, frame) in parent.frames.iter_mut() {
            let step = &query.steps[id as usize];
            frame.threads = advance_threads(query, step, &frame.threads, node, &results);
        }
        parent.frames.retain(|_, frame| !frame.threads.is_empty());

        let before = parent.roots.len();
        let frames = &parent.frames;
        let parent_node = parent.node;
        parent.roots.retain(|root| {
            let alive = is_alive(query, root.step, frames);
            if !alive {
                tracing::trace!(pattern = root.pattern, node = parent_node.id(), "partial match failed");
            }
            alive
        });
        self.in_flight -= before - parent.roots.len();
    }

    fn finish(&mut self, pattern: u32, node: Node<'tree>, mut captures: Vec<QueryCapture<'tree>>) {
        let query = self.query;
        let info = &query.patterns[pattern as usize];
        if !info
            .text_predicates
            .iter()
            .all(|predicate| predicate.satisfied(&captures, self.source))
        {
            tracing::trace!(pattern, node = node.id(), "match rejected by predicate");
            return;
        }

        captures.retain(|capture| !query.is_capture_disabled(capture.index));
        self.arrivals += 1;
        self.finished.insert(
            (node.id(), pattern, self.arrivals),
            QueryMatch {
                pattern_index: pattern as usize,
                captures,
            },
        );
    }
}

/// Create frames for `id` at `node`, expanding alternations into their
/// branches. Returns whether any frame now exists for it.
fn spawn<'tree>(
    query: &Query,
    id: StepId,
    node: Node<'tree>,
    frames: &mut IndexMap<StepId, Frame<'tree>>,
) -> bool {
    let step = &query.steps[id as usize];
    if !step.accepts(node) {
        return false;
    }
    if let Matcher::Alternation(branches) = &step.matcher {
        let mut any = false;
        for &branch in branches {
            any |= spawn(query, branch, node, frames);
        }
        return any;
    }
    frames.entry(id).or_insert_with(|| Frame {
        threads: vec![Thread::start()],
    });
    true
}

fn is_alive(query: &Query, id: StepId, frames: &IndexMap<StepId, Frame<'_>>) -> bool {
    match &query.steps[id as usize].matcher {
        Matcher::Alternation(branches) => branches.iter().any(|&b| is_alive(query, b, frames)),
        _ => frames.contains_key(&id),
    }
}

/// Positions reachable from `(slot, satisfied)` by passing over slots that
/// need no more matches, highest priority first. Ends at the slot count if
/// every remaining slot can be passed.
fn closure(query: &Query, step: &Step, slot: u32, satisfied: bool, out: &mut Vec<(u32, bool)>) {
    out.clear();
    let count = step.slots.len() as u32;
    let (mut slot, mut satisfied) = (slot, satisfied);
    loop {
        out.push((slot, satisfied));
        if slot >= count {
            return;
        }
        let quantifier = query.steps[step.slots[slot as usize].step as usize].quantifier;
        if !(satisfied || quantifier.is_optional()) {
            return;
        }
        slot += 1;
        satisfied = false;
    }
}

fn accepting(query: &Query, step: &Step, thread: &Thread<'_>) -> bool {
    if step.anchor_last && thread.skipped_named {
        return false;
    }
    let mut positions = Vec::new();
    closure(query, step, thread.slot, thread.satisfied, &mut positions);
    positions
        .last()
        .is_some_and(|&(slot, _)| slot as usize == step.slots.len())
}

/// Capture combinations of the accepting threads, each after the step's
/// own captures.
fn finalize<'tree>(query: &Query, id: StepId, frame: &Frame<'tree>, node: Node<'tree>) -> Alternatives<'tree> {
    let step = &query.steps[id as usize];
    let alternatives = frame
        .threads
        .iter()
        .filter(|thread| accepting(query, step, thread))
        .map(|thread| {
            let mut captures = Vec::with_capacity(step.captures.len() + thread.captures.len());
            captures.extend(step.captures.iter().map(|&index| QueryCapture { node, index }));
            captures.extend_from_slice(&thread.captures);
            captures
        })
        .collect();
    maximal(alternatives)
}

/// Capture combinations of `id` matched against `node`; empty if it did not match.
fn step_result<'tree>(
    query: &Query,
    id: StepId,
    node: Node<'tree>,
    results: &HashMap<StepId, Alternatives<'tree>>,
) -> Alternatives<'tree> {
    let step = &query.steps[id as usize];
    match &step.matcher {
        Matcher::Alternation(branches) => {
            let own: Vec<_> = step
                .captures
                .iter()
                .map(|&index| QueryCapture { node, index })
                .collect();
            let alternatives = branches
                .iter()
                .flat_map(|&branch| step_result(query, branch, node, results))
                .map(|inner| {
                    let mut captures = own.clone();
                    captures.extend(inner);
                    captures
                })
                .collect();
            maximal(alternatives)
        }
        _ => results.get(&id).cloned().unwrap_or_default(),
    }
}

/// Feed one child to every thread, once per way the child's step matched it,
/// and once more passing the child over.
fn advance_threads<'tree>(
    query: &Query,
    step: &Step,
    threads: &[Thread<'tree>],
    child: Node<'tree>,
    results: &HashMap<StepId, Alternatives<'tree>>,
) -> Vec<Thread<'tree>> {
    let count = step.slots.len() as u32;
    let mut next: Vec<Thread<'tree>> = Vec::with_capacity(threads.len());
    let mut positions = Vec::new();

    for thread in threads {
        closure(query, step, thread.slot, thread.satisfied, &mut positions);

        for &(slot, _) in &positions {
            let Some(s) = step.slots.get(slot as usize) else {
                continue;
            };
            if s.anchored && thread.skipped_named {
                continue;
            }
            let (slot, satisfied) = if query.steps[s.step as usize].quantifier.is_repeating() {
                (slot, true)
            } else {
                (slot + 1, false)
            };
            for captures in step_result(query, s.step, child, results) {
                let mut consumed = Thread {
                    slot,
                    satisfied,
                    skipped_named: false,
                    captures: thread.captures.clone(),
                };
                consumed.captures.extend(captures);
                push_thread(&mut next, consumed);
            }
        }

        let skipped_named = thread.skipped_named || child.is_named();
        for (i, &(slot, satisfied)) in positions.iter().enumerate() {
            // Once a named child was skipped, some later position must
            // still be able to consume or accept without adjacency.
            if skipped_named
                && !positions[i..].iter().any(|&(slot, _)| match step.slots.get(slot as usize) {
                    Some(s) => !s.anchored,
                    None => slot == count && !step.anchor_last,
                })
            {
                continue;
            }
            push_thread(
                &mut next,
                Thread {
                    slot,
                    satisfied,
                    skipped_named,
                    captures: thread.captures.clone(),
                },
            );
        }
    }

    next
}

fn push_thread<'tree>(threads: &mut Vec<Thread<'tree>>, thread: Thread<'tree>) {
    if threads.iter().any(|t| t.covers(&thread)) {
        return;
    }
    threads.retain(|t| !thread.covers(t));
    threads.push(thread);
}

/// Drop duplicates and combinations contained in another one, keeping order.
fn maximal(alternatives: Alternatives<'_>) -> Alternatives<'_> {
    let mut kept: Alternatives<'_> = Vec::with_capacity(alternatives.len());
    for captures in alternatives {
        if kept.iter().any(|k| contains(k, &captures)) {
            continue;
        }
        kept.retain(|k| !contains(&captures, k));
        kept.push(captures);
    }
    kept
}

/// Whether `outer` holds every capture of `inner`, counting repeats.
fn contains(outer: &[QueryCapture<'_>], inner: &[QueryCapture<'_>]) -> bool {
    if inner.len() > outer.len() {
        return false;
    }
    let key = |c: &QueryCapture<'_>| (c.index, c.node.id());
    let mut outer: Vec<_> = outer.iter().map(key).collect();
    let mut inner: Vec<_> = inner.iter().map(key).collect();
    outer.sort_unstable();
    inner.sort_unstable();

    let mut rest = outer.iter();
    inner.iter().all(|wanted| rest.any(|have| have == wanted))
}
