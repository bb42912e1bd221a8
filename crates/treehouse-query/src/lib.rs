#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Structural queries over treehouse trees.
//!
//! A query is a list of s-expression patterns:
//!
//! ```text
//! (class
//!   name: (constant) @name
//!   (body_statement)? @body)
//! ```
//!
//! Pipeline:
//! - `parser`: logos lexer plus recursive descent into an unresolved pattern tree
//! - `compile`: resolves kinds, fields and captures against a [`Language`],
//!   derives capture quantifiers, compiles predicates
//! - `engine`: [`QueryCursor`] walks a tree in pre-order and advances
//!   Pike-style thread lists per partially matched node
//!
//! [`Language`]: treehouse_core::Language

mod compile;
mod engine;
mod error;
mod parser;
mod predicate;
mod quantifier;
mod query;
mod step;

#[cfg(test)]
pub(crate) mod test_utils;

pub use engine::{QueryCapture, QueryCaptures, QueryCursor, QueryMatch, QueryMatches};
pub use error::{QueryError, QueryErrorKind};
pub use predicate::{QueryPredicate, QueryPredicateArg, TextPredicate};
pub use quantifier::CaptureQuantifier;
pub use query::{DEFAULT_NESTING_LIMIT, Query, QueryBuilder};
