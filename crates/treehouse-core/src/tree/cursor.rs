//! Stateful tree traversal.

use std::fmt;

use super::{Node, Tree};
use crate::{FieldId, Point};

/// A cursor over a subtree.
///
/// Holds the path from the node it was created at down to the current node.
/// It never moves above its starting node; failed moves leave it untouched.
#[derive(Clone)]
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    /// Arena indices from the cursor root (bottom) to the current node (top).
    stack: Vec<u32>,
}

impl<'tree> TreeCursor<'tree> {
    pub(crate) fn new(node: Node<'tree>) -> Self {
        Self {
            tree: node.tree(),
            stack: vec![node.index()],
        }
    }

    #[inline]
    fn current(&self) -> u32 {
        // The stack always holds at least the cursor root.
        self.stack[self.stack.len() - 1]
    }

    #[inline]
    fn root(&self) -> u32 {
        self.stack[0]
    }

    pub fn node(&self) -> Node<'tree> {
        Node::new(self.tree, self.current())
    }

    /// Field of the current node, unless the cursor sits on its starting node.
    pub fn field_id(&self) -> Option<FieldId> {
        if self.stack.len() == 1 {
            return None;
        }
        self.node().field_id()
    }

    pub fn field_name(&self) -> Option<&'tree str> {
        self.tree.language().field_name_for_id(self.field_id()?)
    }

    /// Levels below the starting node.
    pub fn depth(&self) -> u32 {
        self.stack.len() as u32 - 1
    }

    /// Pre-order position of the current node relative to the starting node.
    pub fn descendant_index(&self) -> usize {
        (self.current() - self.root()) as usize
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.tree.child_indices(self.current()).first() {
            Some(&child) => {
                self.stack.push(child);
                true
            }
            None => false,
        }
    }

    pub fn goto_last_child(&mut self) -> bool {
        match self.tree.child_indices(self.current()).last() {
            Some(&child) => {
                self.stack.push(child);
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() == 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        self.step_sibling(1)
    }

    pub fn goto_previous_sibling(&mut self) -> bool {
        self.step_sibling(-1)
    }

    fn step_sibling(&mut self, offset: isize) -> bool {
        if self.stack.len() == 1 {
            return false;
        }
        let record = self.tree.record(self.current());
        let Some(parent) = record.parent else {
            return false;
        };
        let Some(position) = (record.sibling_index as usize).checked_add_signed(offset) else {
            return false;
        };
        match self.tree.child_indices(parent).get(position) {
            Some(&sibling) => {
                let top = self.stack.len() - 1;
                self.stack[top] = sibling;
                true
            }
            None => false,
        }
    }

    /// Move to the `index`-th node of the starting node's subtree, in pre-order.
    pub fn goto_descendant(&mut self, index: usize) -> bool {
        let root = self.root();
        if index >= self.tree.record(root).descendant_count as usize {
            return false;
        }

        let target = root + index as u32;
        let mut path = vec![target];
        let mut current = target;
        while current != root {
            // Every node inside the subtree has a parent inside it too.
            let Some(parent) = self.tree.record(current).parent else {
                return false;
            };
            path.push(parent);
            current = parent;
        }
        path.reverse();
        self.stack = path;
        true
    }

    /// Move to the first child that ends after `byte`; returns its position.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> Option<usize> {
        let children = self.tree.child_indices(self.current());
        let position = children.partition_point(|&c| self.tree.record(c).end_byte <= byte);
        let &child = children.get(position)?;
        self.stack.push(child);
        Some(position)
    }

    /// Move to the first child that ends after `point`; returns its position.
    pub fn goto_first_child_for_point(&mut self, point: Point) -> Option<usize> {
        let children = self.tree.child_indices(self.current());
        let position = children.partition_point(|&c| self.tree.record(c).end_point <= point);
        let &child = children.get(position)?;
        self.stack.push(child);
        Some(position)
    }

    /// Re-seat the cursor on `node`, which becomes its new starting node.
    pub fn reset(&mut self, node: Node<'tree>) {
        self.tree = node.tree();
        self.stack.clear();
        self.stack.push(node.index());
    }

    /// Copy the position and starting node of `other`.
    pub fn reset_to(&mut self, other: &TreeCursor<'tree>) {
        self.tree = other.tree;
        self.stack.clone_from(&other.stack);
    }
}

impl fmt::Debug for TreeCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeCursor")
            .field("node", &self.node())
            .field("depth", &self.depth())
            .finish()
    }
}
