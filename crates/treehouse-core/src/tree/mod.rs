//! Immutable syntax trees.
//!
//! Nodes live in a single arena in pre-order, so the subtree of record `i` is
//! the contiguous interval `[i, i + descendant_count)`. Children are listed in a
//! separate flat table; each record points at its slice of that table.

mod builder;
mod cursor;
mod node;
mod render;

#[cfg(test)]
mod cursor_tests;

use std::fmt;
use std::sync::Arc;

use crate::{FieldId, KindId, Language, Point};

pub use builder::{BuildError, NodeSpec, TreeBuilder};
pub use cursor::TreeCursor;
pub use node::{Children, CursorChildren, Node};

/// Index of the root record.
const ROOT: u32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NodeFlags(u8);

impl NodeFlags {
    pub(crate) const NAMED: u8 = 1 << 0;
    pub(crate) const EXTRA: u8 = 1 << 1;
    pub(crate) const MISSING: u8 = 1 << 2;
    pub(crate) const ERROR: u8 = 1 << 3;
    pub(crate) const HAS_ERROR: u8 = 1 << 4;

    #[inline]
    pub(crate) fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub(crate) fn insert(&mut self, flag: u8) {
        self.0 |= flag;
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub(crate) kind: KindId,
    pub(crate) grammar: KindId,
    pub(crate) start_byte: usize,
    pub(crate) end_byte: usize,
    pub(crate) start_point: Point,
    pub(crate) end_point: Point,
    pub(crate) parent: Option<u32>,
    /// Offset of this node's children in the child table.
    pub(crate) children_start: u32,
    pub(crate) child_count: u32,
    pub(crate) named_child_count: u32,
    /// Position among the parent's children.
    pub(crate) sibling_index: u32,
    /// Size of the subtree rooted here, this node included.
    pub(crate) descendant_count: u32,
    pub(crate) field: Option<FieldId>,
    pub(crate) flags: NodeFlags,
}

impl NodeRecord {
    #[inline]
    pub(crate) fn is_named(&self) -> bool {
        self.flags.contains(NodeFlags::NAMED)
    }

    #[inline]
    pub(crate) fn byte_bounds(&self) -> (usize, usize) {
        (self.start_byte, self.end_byte)
    }

    #[inline]
    pub(crate) fn point_bounds(&self) -> (Point, Point) {
        (self.start_point, self.end_point)
    }
}

/// A parsed syntax tree.
///
/// Read-only once built. Cloning shares the underlying arena.
#[derive(Clone)]
pub struct Tree {
    inner: Arc<TreeInner>,
}

struct TreeInner {
    language: Language,
    nodes: Vec<NodeRecord>,
    children: Vec<u32>,
}

impl Tree {
    pub(crate) fn from_parts(language: Language, nodes: Vec<NodeRecord>, children: Vec<u32>) -> Self {
        Self {
            inner: Arc::new(TreeInner {
                language,
                nodes,
                children,
            }),
        }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, ROOT)
    }

    /// Cursor positioned at the root.
    pub fn walk(&self) -> TreeCursor<'_> {
        self.root_node().walk()
    }

    pub fn language(&self) -> &Language {
        &self.inner.language
    }

    /// Total number of nodes, anonymous ones included.
    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    #[inline]
    pub(crate) fn record(&self, index: u32) -> &NodeRecord {
        &self.inner.nodes[index as usize]
    }

    #[inline]
    pub(crate) fn child_indices(&self, index: u32) -> &[u32] {
        let record = self.record(index);
        let start = record.children_start as usize;
        &self.inner.children[start..start + record.child_count as usize]
    }

    #[inline]
    pub(crate) fn same_tree(&self, other: &Tree) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree {{ language: {}, root: {} }}",
            self.language().name(),
            self.root_node().to_sexp()
        )
    }
}
