//! Name-keyed grammar registry.

use std::collections::{BTreeSet, HashMap};
use std::sync::{LazyLock, RwLock};

use crate::tree_sitter;
use crate::{Grammar, LangError};

/// Grammars by registered name.
///
/// The free functions of this module operate on one process-wide instance;
/// callers that need isolation can keep their own.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    grammars: HashMap<String, Grammar>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ts` under `name`, replacing any grammar already there.
    pub fn register(&mut self, name: &str, ts: tree_sitter::Language) -> Result<Grammar, LangError> {
        let grammar = Grammar::new(name, ts)?;
        tracing::debug!(
            language = name,
            abi_version = grammar.language().abi_version(),
            kinds = grammar.language().kind_count(),
            "registered language"
        );
        self.grammars.insert(name.to_owned(), grammar.clone());
        Ok(grammar)
    }

    pub fn get(&self, name: &str) -> Option<&Grammar> {
        self.grammars.get(name)
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.grammars.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

static REGISTRY: LazyLock<RwLock<LanguageRegistry>> = LazyLock::new(Default::default);

/// Register a grammar in the process-wide registry.
///
/// Fails when the grammar was generated for an ABI this runtime cannot load.
pub fn register_language(name: &str, ts: tree_sitter::Language) -> Result<(), LangError> {
    // A panic while holding the lock cannot leave the map half-updated.
    let mut registry = REGISTRY.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.register(name, ts).map(drop)
}

/// Names of every grammar in the process-wide registry.
pub fn available_languages() -> BTreeSet<String> {
    let registry = REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.names()
}

/// Look up a grammar in the process-wide registry.
pub fn language(name: &str) -> Option<Grammar> {
    let registry = REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.get(name).cloned()
}
