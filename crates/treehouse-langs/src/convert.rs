//! Copy a tree-sitter tree into the arena representation.

use treehouse_core::{BuildError, NodeSpec, Point, Tree, TreeBuilder};

use crate::Grammar;
use crate::tree_sitter;

fn point(p: tree_sitter::Point) -> Point {
    Point::new(p.row, p.column)
}

/// Pre-order walk with tree-sitter's own cursor, feeding each node to a [`TreeBuilder`].
pub(crate) fn convert(grammar: &Grammar, ts_tree: &tree_sitter::Tree) -> Result<Tree, BuildError> {
    let mut builder = TreeBuilder::with_capacity(
        grammar.language().clone(),
        ts_tree.root_node().descendant_count(),
    );
    let mut cursor = ts_tree.walk();

    loop {
        let node = cursor.node();
        let spec = NodeSpec::new(grammar.kind(node.kind_id()), node.start_byte(), point(node.start_position()))
            .grammar_id(grammar.kind(node.grammar_id()))
            .field(cursor.field_id())
            .extra(node.is_extra())
            .missing(node.is_missing());
        builder.open(spec)?;

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            let node = cursor.node();
            builder.close(node.end_byte(), point(node.end_position()))?;
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return builder.build();
            }
        }
    }
}
