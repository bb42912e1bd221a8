//! Node handles.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::Utf8Error;

use super::{NodeFlags, NodeRecord, Tree, TreeCursor};
use crate::{FieldId, KindId, Language, Point, Range};

/// A lightweight handle to one node of a [`Tree`].
///
/// Two nodes are equal when they come from the same tree and sit at the same
/// arena index.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    index: u32,
}

impl<'tree> Node<'tree> {
    #[inline]
    pub(crate) fn new(tree: &'tree Tree, index: u32) -> Self {
        Self { tree, index }
    }

    #[inline]
    fn record(&self) -> &'tree NodeRecord {
        self.tree.record(self.index)
    }

    #[inline]
    fn at(&self, index: u32) -> Node<'tree> {
        Node::new(self.tree, index)
    }

    #[inline]
    pub(crate) fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    fn child_indices(&self) -> &'tree [u32] {
        self.tree.child_indices(self.index)
    }

    /// Pre-order index within the tree; unique per tree.
    pub fn id(&self) -> usize {
        self.index as usize
    }

    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    pub fn language(&self) -> &'tree Language {
        self.tree.language()
    }

    pub fn kind_id(&self) -> KindId {
        self.record().kind
    }

    pub fn kind(&self) -> &'tree str {
        self.language().kind_name(self.kind_id()).unwrap_or_default()
    }

    /// Grammar-internal symbol before aliasing.
    pub fn grammar_id(&self) -> KindId {
        self.record().grammar
    }

    pub fn grammar_name(&self) -> &'tree str {
        self.language()
            .kind_name(self.grammar_id())
            .unwrap_or_default()
    }

    pub fn is_named(&self) -> bool {
        self.record().is_named()
    }

    pub fn is_extra(&self) -> bool {
        self.record().flags.contains(NodeFlags::EXTRA)
    }

    pub fn is_error(&self) -> bool {
        self.record().flags.contains(NodeFlags::ERROR)
    }

    pub fn is_missing(&self) -> bool {
        self.record().flags.contains(NodeFlags::MISSING)
    }

    /// Whether this node or any descendant is an error or missing node.
    pub fn has_error(&self) -> bool {
        self.record().flags.contains(NodeFlags::HAS_ERROR)
    }

    pub fn start_byte(&self) -> usize {
        self.record().start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.record().end_byte
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte()..self.end_byte()
    }

    pub fn start_position(&self) -> Point {
        self.record().start_point
    }

    pub fn end_position(&self) -> Point {
        self.record().end_point
    }

    pub fn range(&self) -> Range {
        let r = self.record();
        Range::new(r.start_byte, r.end_byte, r.start_point, r.end_point)
    }

    pub fn child_count(&self) -> usize {
        self.record().child_count as usize
    }

    pub fn named_child_count(&self) -> usize {
        self.record().named_child_count as usize
    }

    /// Size of the subtree rooted here, this node included.
    pub fn descendant_count(&self) -> usize {
        self.record().descendant_count as usize
    }

    pub fn child(&self, i: usize) -> Option<Node<'tree>> {
        self.child_indices().get(i).map(|&c| self.at(c))
    }

    pub fn named_child(&self, i: usize) -> Option<Node<'tree>> {
        self.named_children().nth(i)
    }

    pub fn child_by_field_id(&self, field: FieldId) -> Option<Node<'tree>> {
        self.children().find(|c| c.field_id() == Some(field))
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'tree>> {
        self.child_by_field_id(self.language().field_id_for_name(name)?)
    }

    pub fn children_by_field_id(&self, field: FieldId) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children().filter(move |c| c.field_id() == Some(field))
    }

    /// Empty when the language has no such field.
    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        let field = self.language().field_id_for_name(name);
        self.children()
            .filter(move |c| field.is_some() && c.field_id() == field)
    }

    /// Field this node occupies under its parent.
    pub fn field_id(&self) -> Option<FieldId> {
        self.record().field
    }

    pub fn field_name(&self) -> Option<&'tree str> {
        self.language().field_name_for_id(self.field_id()?)
    }

    pub fn field_name_for_child(&self, i: usize) -> Option<&'tree str> {
        self.child(i)?.field_name()
    }

    pub fn parent(&self) -> Option<Node<'tree>> {
        self.record().parent.map(|p| self.at(p))
    }

    fn sibling_at(&self, offset: isize) -> Option<Node<'tree>> {
        let parent = self.record().parent?;
        let position = (self.record().sibling_index as usize).checked_add_signed(offset)?;
        self.tree
            .child_indices(parent)
            .get(position)
            .map(|&c| self.at(c))
    }

    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        self.sibling_at(1)
    }

    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        self.sibling_at(-1)
    }

    pub fn next_named_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let after = self.record().sibling_index as usize + 1;
        parent.children().skip(after).find(Node::is_named)
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let before = self.record().sibling_index as usize;
        parent.children().take(before).rev().find(Node::is_named)
    }

    /// Whether `other` lies strictly inside this node's subtree.
    pub fn is_ancestor_of(&self, other: &Node<'tree>) -> bool {
        self.tree.same_tree(other.tree)
            && other.index > self.index
            && other.index < self.index + self.record().descendant_count
    }

    /// The direct child of this node whose subtree holds `descendant`.
    ///
    /// Returns `descendant` itself when it is a direct child, and `None` when
    /// it is not under this node at all.
    pub fn child_containing_descendant(&self, descendant: Node<'tree>) -> Option<Node<'tree>> {
        if !self.is_ancestor_of(&descendant) {
            return None;
        }
        let children = self.child_indices();
        let position = children.partition_point(|&c| c <= descendant.index);
        children.get(position.checked_sub(1)?).map(|&c| self.at(c))
    }

    /// Smallest node within this subtree that spans `[start, end)`.
    ///
    /// At a boundary shared by two siblings the following node is preferred.
    /// `None` when the range is not inside this node.
    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, NodeRecord::byte_bounds, false)
    }

    /// Like [`Self::descendant_for_byte_range`], but stops at the deepest named
    /// node on the way down, falling back to this node.
    pub fn named_descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, NodeRecord::byte_bounds, true)
    }

    pub fn descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, NodeRecord::point_bounds, false)
    }

    pub fn named_descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, NodeRecord::point_bounds, true)
    }

    fn descendant_for_range<T: Ord + Copy>(
        &self,
        start: T,
        end: T,
        bounds: fn(&NodeRecord) -> (T, T),
        named_only: bool,
    ) -> Option<Node<'tree>> {
        let (node_start, node_end) = bounds(self.record());
        if start > end || start < node_start || end > node_end {
            return None;
        }

        let mut node = *self;
        let mut last_named = *self;
        'descend: loop {
            let children = node.child_indices();
            // Children are sorted by end; skip those that end at or before `start`.
            let first = children.partition_point(|&c| bounds(self.tree.record(c)).1 <= start);
            for &c in &children[first..] {
                let (child_start, child_end) = bounds(self.tree.record(c));
                if child_start > start {
                    break;
                }
                if end <= child_end {
                    node = node.at(c);
                    if node.is_named() {
                        last_named = node;
                    }
                    continue 'descend;
                }
            }
            break;
        }

        Some(if named_only { last_named } else { node })
    }

    /// `source[start_byte..end_byte]` decoded as UTF-8.
    ///
    /// # Panics
    ///
    /// If `source` is shorter than the text this tree was parsed from.
    pub fn utf8_text<'s>(&self, source: &'s [u8]) -> Result<&'s str, Utf8Error> {
        std::str::from_utf8(self.byte_text(source))
    }

    pub fn byte_text<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        &source[self.byte_range()]
    }

    pub fn walk(&self) -> TreeCursor<'tree> {
        TreeCursor::new(*self)
    }

    /// Direct children, named and anonymous, in order.
    pub fn children(&self) -> Children<'tree> {
        Children {
            tree: self.tree,
            indices: self.child_indices().iter(),
        }
    }

    pub fn named_children(&self) -> impl DoubleEndedIterator<Item = Node<'tree>> + use<'tree> {
        self.children().filter(Node::is_named)
    }

    /// Direct children, stepping `cursor` instead of allocating traversal state.
    ///
    /// The cursor is reset to this node first, so the sequence can be restarted.
    pub fn children_with_cursor<'c>(&self, cursor: &'c mut TreeCursor<'tree>) -> CursorChildren<'c, 'tree> {
        cursor.reset(*self);
        cursor.goto_first_child();
        CursorChildren {
            cursor,
            remaining: self.child_count(),
        }
    }

    pub fn named_children_with_cursor<'c>(
        &self,
        cursor: &'c mut TreeCursor<'tree>,
    ) -> impl Iterator<Item = Node<'tree>> + use<'c, 'tree> {
        self.children_with_cursor(cursor).filter(Node::is_named)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.tree.same_tree(other.tree)
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

/// Iterator over the direct children of a node, backed by the child table.
#[derive(Clone)]
pub struct Children<'tree> {
    tree: &'tree Tree,
    indices: std::slice::Iter<'tree, u32>,
}

impl<'tree> Iterator for Children<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        self.indices.next().map(|&c| Node::new(self.tree, c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.indices.nth(n).map(|&c| Node::new(self.tree, c))
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.indices.next_back().map(|&c| Node::new(self.tree, c))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Iterator over the direct children of a node that steps a borrowed cursor.
pub struct CursorChildren<'c, 'tree> {
    cursor: &'c mut TreeCursor<'tree>,
    remaining: usize,
}

impl<'tree> Iterator for CursorChildren<'_, 'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let node = self.cursor.node();
        self.cursor.goto_next_sibling();
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CursorChildren<'_, '_> {}
