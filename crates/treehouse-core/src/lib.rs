#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for treehouse syntax trees.
//!
//! Three layers:
//! - **Language**: immutable kind/field tables shared by every tree and query
//! - **Tree**: a pre-order arena of node records plus a flat child table
//! - **Handles**: `Node` (copyable `(tree, index)` pair) and `TreeCursor`
//!   (stack of ancestor indices)
//!
//! Trees are produced by [`TreeBuilder`], which the parser bridge drives
//! while walking the external engine's output.

use std::num::NonZeroU16;

mod language;
mod position;
mod tree;

#[cfg(test)]
pub(crate) mod test_utils;

pub use language::{KindDescriptor, Language, LanguageDescriptor, LanguageError};
pub use position::{Point, Range};
pub use tree::{
    BuildError, Children, CursorChildren, Node, NodeSpec, Tree, TreeBuilder, TreeCursor,
};

/// Node kind ID (grammar symbol).
pub type KindId = u16;

/// Field ID. Zero is reserved for "no field", hence `NonZeroU16`.
pub type FieldId = NonZeroU16;

/// Kind ID the parsing engine assigns to error nodes.
///
/// Lies outside the dense kind table; [`Language::kind_name`] resolves it to `"ERROR"`.
pub const ERROR_KIND: KindId = u16::MAX;

/// Name reported for [`ERROR_KIND`] nodes.
pub const ERROR_KIND_NAME: &str = "ERROR";
