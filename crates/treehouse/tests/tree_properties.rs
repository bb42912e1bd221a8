//! Structural invariants of trees produced from real Ruby.

mod common;

use indoc::indoc;

use common::{all_nodes, parse_ruby, text};

const SOURCE: &str = indoc! {r#"
    # frozen_string_literal: true
    module Shapes
      class Circle < Base
        attr_reader :radius

        def initialize(radius)
          @radius = radius
        end

        def area
          3.14 * radius ** 2
        end
      end
    end

    puts Shapes::Circle.new(2).area
    x = [1, 2, "three", { four: 4 }]
"#};

#[test]
fn child_counts_add_up() {
    let tree = parse_ruby(SOURCE);
    for node in all_nodes(&tree) {
        let anonymous = node.children().filter(|c| !c.is_named()).count();
        assert_eq!(node.child_count(), node.named_child_count() + anonymous, "{node:?}");
    }
}

#[test]
fn children_are_ordered_disjoint_and_contained() {
    let tree = parse_ruby(SOURCE);
    for node in all_nodes(&tree) {
        let mut previous_end = node.start_byte();
        for child in node.children() {
            assert!(child.start_byte() >= previous_end, "{child:?} overlaps its previous sibling");
            assert!(child.end_byte() <= node.end_byte(), "{child:?} escapes {node:?}");
            assert!(child.start_byte() <= child.end_byte());
            previous_end = child.end_byte();
        }
    }
}

#[test]
fn parent_and_sibling_links_agree() {
    let tree = parse_ruby(SOURCE);
    for node in all_nodes(&tree) {
        for i in 0..node.child_count() {
            let child = node.child(i).unwrap();
            assert_eq!(child.parent(), Some(node));
        }
        if let Some(first) = node.child(0) {
            assert_eq!(first.prev_sibling(), None);
        }
    }
    assert_eq!(tree.root_node().parent(), None);
}

#[test]
fn text_round_trips() {
    let tree = parse_ruby(SOURCE);
    for node in all_nodes(&tree) {
        assert_eq!(text(node, SOURCE), &SOURCE[node.start_byte()..node.end_byte()]);
    }
    assert_eq!(text(tree.root_node(), SOURCE).trim_end(), SOURCE.trim_end());
}

#[test]
fn byte_range_lookup_finds_the_smallest_node() {
    let tree = parse_ruby(SOURCE);
    let root = tree.root_node();
    let nodes = all_nodes(&tree);
    for &node in &nodes {
        let range = node.byte_range();
        let shared = nodes
            .iter()
            .any(|other| *other != node && node.is_ancestor_of(other) && other.byte_range() == range);
        if range.is_empty() || shared {
            continue;
        }
        assert_eq!(root.descendant_for_byte_range(range.start, range.end), Some(node));
    }
}

#[test]
fn descendant_index_round_trips() {
    let tree = parse_ruby(SOURCE);
    let mut walker = tree.walk();
    let mut cursor = tree.walk();
    let mut visited = 0;
    let mut done = false;
    while !done {
        assert_eq!(walker.descendant_index(), visited);
        assert!(cursor.goto_descendant(visited));
        assert_eq!(cursor.node(), walker.node());
        visited += 1;

        if walker.goto_first_child() {
            continue;
        }
        while !walker.goto_next_sibling() {
            if !walker.goto_parent() {
                done = true;
                break;
            }
        }
    }
    assert_eq!(visited, tree.node_count());
}

#[test]
fn named_lookup_skips_anonymous_tokens() {
    let tree = parse_ruby(SOURCE);
    let start = SOURCE.find("def area").unwrap();
    let named = tree
        .root_node()
        .named_descendant_for_byte_range(start, start + 3)
        .unwrap();
    assert_eq!(named.kind(), "method");

    let any = tree.root_node().descendant_for_byte_range(start, start + 3).unwrap();
    assert_eq!(any.kind(), "def");
    assert!(!any.is_named());
}
