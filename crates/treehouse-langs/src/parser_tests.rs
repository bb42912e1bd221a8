use arborium_tree_sitter as tree_sitter;

use crate::{Grammar, LangError, Parser, register_language};

fn ruby_grammar() -> Grammar {
    let ts: tree_sitter::Language = arborium_ruby::language().into();
    Grammar::new("ruby", ts).unwrap()
}

#[test]
fn parse_without_language_fails() {
    let mut parser = Parser::new();
    assert!(parser.language().is_none());
    assert_eq!(parser.parse("class Foo; end").unwrap_err(), LangError::NoLanguage);
}

#[test]
fn set_unregistered_language_fails() {
    let mut parser = Parser::new();
    let err = parser.set_language("parser-test-klingon").unwrap_err();
    assert_eq!(err, LangError::NotRegistered("parser-test-klingon".to_owned()));
}

#[test]
fn set_registered_language() {
    let ts: tree_sitter::Language = arborium_ruby::language().into();
    register_language("parser-test-ruby", ts).unwrap();

    let mut parser = Parser::new();
    parser.set_language("parser-test-ruby").unwrap();
    assert_eq!(parser.language().unwrap().name(), "parser-test-ruby");
    assert_eq!(parser.grammar().unwrap().name(), "parser-test-ruby");
}

#[test]
fn converts_structure() {
    let source = "class Foo\n  def bar\n  end\nend\n";
    let mut parser = Parser::new();
    parser.set_grammar(&ruby_grammar()).unwrap();
    let tree = parser.parse(source).unwrap();

    let root = tree.root_node();
    assert_eq!(
        root.to_sexp(),
        "(program (class name: (constant) body: (body_statement (method name: (identifier)))))"
    );
    assert!(!root.has_error());

    let class = root.child(0).unwrap();
    assert_eq!(class.utf8_text(source.as_bytes()).unwrap(), "class Foo\n  def bar\n  end\nend");
    assert_eq!(class.child(0).unwrap().kind(), "class");
    assert!(!class.child(0).unwrap().is_named());
    assert_eq!(
        class.child_by_field_name("name").unwrap().utf8_text(source.as_bytes()).unwrap(),
        "Foo"
    );
}

#[test]
fn matches_tree_sitter_node_for_node() {
    let source = "x = [1, 2]\nputs(x) # done\n";
    let grammar = ruby_grammar();

    let mut ts_parser = tree_sitter::Parser::new();
    ts_parser.set_language(grammar.ts_language()).unwrap();
    let ts_tree = ts_parser.parse(source, None).unwrap();

    let mut parser = Parser::new();
    parser.set_grammar(&grammar).unwrap();
    let tree = parser.parse(source).unwrap();

    assert_eq!(tree.node_count(), ts_tree.root_node().descendant_count());

    let mut ts_cursor = ts_tree.walk();
    let mut cursor = tree.walk();
    for index in 0..tree.node_count() {
        ts_cursor.goto_descendant(index);
        assert!(cursor.goto_descendant(index));
        let (ts_node, node) = (ts_cursor.node(), cursor.node());
        assert_eq!(node.kind(), ts_node.kind());
        assert_eq!(node.byte_range(), ts_node.byte_range());
        assert_eq!(node.is_named(), ts_node.is_named());
        assert_eq!(node.is_extra(), ts_node.is_extra());
        assert_eq!(node.child_count(), ts_node.child_count());
        assert_eq!(cursor.field_name(), ts_cursor.field_name());
    }
}

#[test]
fn syntax_errors_become_nodes() {
    let source = "class Foo\n  def bar(\nend\n";
    let mut parser = Parser::new();
    parser.set_grammar(&ruby_grammar()).unwrap();
    let tree = parser.parse(source).unwrap();

    assert!(tree.root_node().has_error());
    let mut cursor = tree.walk();
    let mut flagged = false;
    for index in 0..tree.node_count() {
        cursor.goto_descendant(index);
        let node = cursor.node();
        flagged |= node.is_error() || node.is_missing();
    }
    assert!(flagged);
}

#[test]
fn reset_keeps_language() {
    let mut parser = Parser::new();
    parser.set_grammar(&ruby_grammar()).unwrap();
    parser.reset();
    assert!(parser.parse("1 + 2").is_ok());
}

#[test]
fn parsed_kinds_resolve_by_name() {
    let source = "foo(1 + 2)\n";
    let mut parser = Parser::new();
    parser.set_grammar(&ruby_grammar()).unwrap();
    let tree = parser.parse(source).unwrap();
    let lang = tree.language();

    let call = tree.root_node().named_child(0).unwrap();
    assert_eq!(call.kind(), "call");
    assert_eq!(lang.id_for_kind("call", true), Some(call.kind_id()));

    let args = call.child_by_field_name("arguments").unwrap();
    assert_eq!(lang.id_for_kind("argument_list", true), Some(args.kind_id()));
    let binary = args.named_child(0).unwrap();
    assert_eq!(lang.id_for_kind("binary", true), Some(binary.kind_id()));
}
