//! Registry, parser and rendering through the facade.

mod common;

use treehouse::{LangError, Parser, available_languages, register_language};

use common::{init_tracing, parse_ruby};

#[test]
fn register_and_parse_by_name() {
    init_tracing();
    register_language("facade-ruby", arborium_ruby::language().into()).unwrap();
    assert!(available_languages().contains("facade-ruby"));
    assert_eq!(treehouse::language("facade-ruby").unwrap().name(), "facade-ruby");

    let mut parser = Parser::new();
    parser.set_language("facade-ruby").unwrap();
    let tree = parser.parse("puts 1").unwrap();
    assert_eq!(tree.language().name(), "facade-ruby");
}

#[test]
fn unknown_language_is_reported() {
    let mut parser = Parser::new();
    assert_eq!(
        parser.set_language("facade-cobol").unwrap_err(),
        LangError::NotRegistered("facade-cobol".to_owned())
    );
}

#[test]
fn sexp_of_a_class() {
    let tree = parse_ruby("class Foo\n  def bar\n  end\nend\n");
    insta::assert_snapshot!(
        tree.root_node().to_sexp(),
        @"(program (class name: (constant) body: (body_statement (method name: (identifier)))))"
    );
}

#[test]
fn dot_graph_lists_every_node() {
    let tree = parse_ruby("x = 1\n");
    let mut out = Vec::new();
    tree.print_dot_graph(&mut out).unwrap();
    let dot = String::from_utf8(out).unwrap();

    assert!(dot.starts_with("digraph"), "{dot}");
    assert!(dot.contains("assignment"), "{dot}");
    assert!(dot.trim_end().ends_with('}'), "{dot}");
}

#[test]
fn bundled_grammars_register_globally() {
    treehouse::builtin::register_all_global().unwrap();
    assert!(available_languages().contains("ruby"));

    let mut parser = Parser::new();
    parser.set_language("ruby").unwrap();
    assert_eq!(parser.parse("def f; end").unwrap().root_node().kind(), "program");
}
