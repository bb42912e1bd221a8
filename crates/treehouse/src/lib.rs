#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! treehouse: concrete syntax trees and structural queries over tree-sitter
//! grammars.
//!
//! # Example
//!
//! ```
//! use treehouse::{Parser, ParserExt, QueryCursor, builtin};
//!
//! let source = "class Foo\n  def bar\n  end\nend\n";
//!
//! let mut parser = Parser::new();
//! parser.set_grammar(&builtin::ruby()?)?;
//! let tree = parser.parse(source)?;
//!
//! let query = parser.build_query("(method name: (identifier) @name)")?;
//! let mut cursor = QueryCursor::new();
//! let names: Vec<_> = cursor
//!     .matches(&query, tree.root_node(), source.as_bytes())
//!     .map(|m| m.captures[0].node.utf8_text(source.as_bytes()).unwrap().to_owned())
//!     .collect();
//! assert_eq!(names, ["bar"]);
//! # Ok::<(), treehouse::Error>(())
//! ```

pub use arborium_tree_sitter as tree_sitter;

pub use treehouse_core::{
    BuildError, Children, CursorChildren, ERROR_KIND, ERROR_KIND_NAME, FieldId, KindDescriptor, KindId,
    Language, LanguageDescriptor, LanguageError, Node, NodeSpec, Point, Range, Tree, TreeBuilder,
    TreeCursor,
};
pub use treehouse_langs::{
    Grammar, LANGUAGE_VERSION, LangError, LanguageRegistry, MIN_COMPATIBLE_LANGUAGE_VERSION, Parser,
    available_languages, builtin, language, register_language,
};
pub use treehouse_query::{
    CaptureQuantifier, DEFAULT_NESTING_LIMIT, Query, QueryBuilder, QueryCapture, QueryCaptures, QueryCursor,
    QueryError, QueryErrorKind, QueryMatch, QueryMatches, QueryPredicate, QueryPredicateArg, TextPredicate,
};

/// Errors from the parse-then-query workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lang(#[from] LangError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compile queries against the language a [`Parser`] is bound to.
pub trait ParserExt {
    /// Compile `source` with the default [`QueryBuilder`].
    ///
    /// Fails with [`LangError::NoLanguage`] before a language is set.
    fn build_query(&self, source: &str) -> Result<Query>;

    fn build_query_with(&self, builder: &QueryBuilder, source: &str) -> Result<Query>;
}

impl ParserExt for Parser {
    fn build_query(&self, source: &str) -> Result<Query> {
        self.build_query_with(&QueryBuilder::new(), source)
    }

    fn build_query_with(&self, builder: &QueryBuilder, source: &str) -> Result<Query> {
        let language = self.language().ok_or(LangError::NoLanguage)?;
        Ok(builder.build(language, source)?)
    }
}
