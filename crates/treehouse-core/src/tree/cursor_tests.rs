use crate::Point;
use crate::test_utils::sample_tree;

#[test]
fn steps_through_children() {
    let tree = sample_tree();
    let mut cursor = tree.walk();

    assert_eq!(cursor.node().kind(), "program");
    assert_eq!(cursor.depth(), 0);
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "class");
    assert!(cursor.goto_first_child());
    assert!(!cursor.node().is_named());
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind(), "constant");
    assert_eq!(cursor.field_name(), Some("name"));
    assert_eq!(cursor.depth(), 2);
    assert!(cursor.goto_previous_sibling());
    assert!(!cursor.goto_previous_sibling());
    assert_eq!(cursor.field_id(), None);
    assert!(cursor.goto_parent());
    assert!(cursor.goto_parent());
    assert!(!cursor.goto_parent());
    assert_eq!(cursor.node(), tree.root_node());
}

#[test]
fn failed_moves_leave_cursor_in_place() {
    let tree = sample_tree();
    let mut cursor = tree.walk();

    assert!(cursor.goto_last_child());
    assert_eq!(cursor.node().start_byte(), 30);
    assert!(!cursor.goto_next_sibling());
    assert_eq!(cursor.node().start_byte(), 30);

    assert!(cursor.goto_last_child());
    assert_eq!(cursor.node().kind(), "end");
    let before = cursor.node();
    assert!(!cursor.goto_first_child());
    assert!(!cursor.goto_last_child());
    assert_eq!(cursor.node(), before);
}

#[test]
fn never_climbs_above_start() {
    let tree = sample_tree();
    let class = tree.root_node().child(0).unwrap();
    let mut cursor = class.walk();

    assert_eq!(cursor.field_id(), None);
    assert!(!cursor.goto_parent());
    assert!(!cursor.goto_next_sibling());
    assert_eq!(cursor.node(), class);

    assert!(cursor.goto_first_child());
    assert!(cursor.goto_parent());
    assert!(!cursor.goto_parent());
}

#[test]
fn descendant_index_round_trips() {
    let tree = sample_tree();
    let mut cursor = tree.walk();
    let mut walker = tree.walk();

    for index in 0..tree.node_count() {
        assert!(cursor.goto_descendant(index));
        assert_eq!(cursor.descendant_index(), index);
        assert_eq!(cursor.node().id(), index);

        let node = cursor.node();
        walker.goto_descendant(node.id());
        assert_eq!(walker.node(), node);
    }

    assert!(cursor.goto_descendant(7));
    assert_eq!(cursor.node().kind(), "identifier");
    assert_eq!(cursor.depth(), 4);
    assert_eq!(cursor.field_name(), Some("name"));
    assert!(cursor.goto_parent());
    assert_eq!(cursor.node().kind(), "method");

    let before = cursor.node();
    assert!(!cursor.goto_descendant(tree.node_count()));
    assert_eq!(cursor.node(), before);
}

#[test]
fn descendant_index_is_relative_to_start() {
    let tree = sample_tree();
    let second_class = tree.root_node().child(1).unwrap();
    let mut cursor = second_class.walk();

    assert!(cursor.goto_descendant(2));
    assert_eq!(cursor.node().kind(), "constant");
    assert_eq!(cursor.descendant_index(), 2);
    assert!(!cursor.goto_descendant(4));
}

#[test]
fn first_child_for_byte_and_point() {
    let tree = sample_tree();
    let mut cursor = tree.walk();

    assert_eq!(cursor.goto_first_child_for_byte(29), Some(1));
    assert_eq!(cursor.node().start_byte(), 30);

    cursor.reset(tree.root_node());
    assert_eq!(cursor.goto_first_child_for_byte(3), Some(0));
    assert_eq!(cursor.goto_first_child_for_byte(10), Some(2));
    assert_eq!(cursor.node().kind(), "body_statement");

    cursor.reset(tree.root_node());
    assert_eq!(cursor.goto_first_child_for_byte(44), None);
    assert_eq!(cursor.node(), tree.root_node());

    assert_eq!(cursor.goto_first_child_for_point(Point::new(4, 0)), Some(1));
    assert_eq!(cursor.goto_first_child_for_point(Point::new(4, 7)), Some(1));
    assert_eq!(cursor.node().kind(), "constant");
}

#[test]
fn reset_to_copies_position() {
    let tree = sample_tree();
    let mut source = tree.walk();
    source.goto_descendant(5);

    let mut copy = tree.walk();
    copy.reset_to(&source);
    assert_eq!(copy.node().kind(), "method");
    assert_eq!(copy.depth(), 3);
    assert!(copy.goto_parent());
    assert_eq!(copy.node().kind(), "body_statement");
    assert_eq!(source.node().kind(), "method");
}
