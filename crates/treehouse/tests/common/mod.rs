#![allow(dead_code)]

use treehouse::{Node, Parser, Tree, builtin};
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness; `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .with_target(false)
        .try_init();
}

pub fn ruby_parser() -> Parser {
    init_tracing();
    let mut parser = Parser::new();
    parser.set_grammar(&builtin::ruby().unwrap()).unwrap();
    parser
}

pub fn parse_ruby(source: &str) -> Tree {
    ruby_parser().parse(source).unwrap()
}

/// Every node of `tree` in pre-order.
pub fn all_nodes(tree: &Tree) -> Vec<Node<'_>> {
    let mut cursor = tree.walk();
    (0..tree.node_count())
        .map(|index| {
            assert!(cursor.goto_descendant(index));
            cursor.node()
        })
        .collect()
}

pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap()
}
