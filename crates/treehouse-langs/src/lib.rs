#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Bridge between tree-sitter grammars and treehouse trees.
//!
//! Grammars are registered by name in a process-wide [`LanguageRegistry`].
//! A [`Parser`] binds to one of them, delegates parsing to tree-sitter, and
//! copies the result into an arena [`Tree`](treehouse_core::Tree).

use arborium_tree_sitter as tree_sitter;

pub mod builtin;
mod convert;
mod error;
mod grammar;
mod parser;
mod registry;

#[cfg(test)]
mod parser_tests;
#[cfg(test)]
mod registry_tests;

pub use error::LangError;
pub use grammar::Grammar;
pub use parser::Parser;
pub use registry::{LanguageRegistry, available_languages, language, register_language};

/// Newest grammar ABI the bundled tree-sitter runtime understands.
pub const LANGUAGE_VERSION: usize = tree_sitter::LANGUAGE_VERSION;

/// Oldest grammar ABI the bundled tree-sitter runtime still accepts.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: usize = tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION;
