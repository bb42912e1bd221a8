use treehouse_core::{Language, Tree};

use crate::convert::convert;
use crate::tree_sitter;
use crate::{Grammar, LangError, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION};

/// Parses text with a registered grammar.
///
/// Syntax errors never fail a parse; they show up as error and missing
/// nodes in the returned tree.
pub struct Parser {
    ts: tree_sitter::Parser,
    grammar: Option<Grammar>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            ts: tree_sitter::Parser::new(),
            grammar: None,
        }
    }

    /// Bind to the grammar registered under `name`.
    pub fn set_language(&mut self, name: &str) -> Result<(), LangError> {
        let grammar = crate::language(name).ok_or_else(|| LangError::NotRegistered(name.to_owned()))?;
        self.set_grammar(&grammar)
    }

    pub fn set_grammar(&mut self, grammar: &Grammar) -> Result<(), LangError> {
        self.ts
            .set_language(grammar.ts_language())
            .map_err(|_| LangError::IncompatibleAbi {
                name: grammar.name().to_owned(),
                version: grammar.language().abi_version(),
                min: MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: LANGUAGE_VERSION,
            })?;
        tracing::debug!(language = grammar.name(), "parser language set");
        self.grammar = Some(grammar.clone());
        Ok(())
    }

    pub fn language(&self) -> Option<&Language> {
        self.grammar.as_ref().map(Grammar::language)
    }

    pub fn grammar(&self) -> Option<&Grammar> {
        self.grammar.as_ref()
    }

    pub fn parse(&mut self, text: impl AsRef<[u8]>) -> Result<Tree, LangError> {
        let grammar = self.grammar.as_ref().ok_or(LangError::NoLanguage)?;
        let ts_tree = self.ts.parse(text, None).ok_or(LangError::Aborted)?;
        Ok(convert(grammar, &ts_tree)?)
    }

    /// Discard any state left over from an interrupted parse.
    pub fn reset(&mut self) {
        self.ts.reset();
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
