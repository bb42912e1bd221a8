//! A tree-sitter grammar paired with its treehouse [`Language`].

use std::fmt;

use treehouse_core::{ERROR_KIND, KindId, Language, LanguageDescriptor};

use crate::tree_sitter;
use crate::{LANGUAGE_VERSION, LangError, MIN_COMPATIBLE_LANGUAGE_VERSION};

#[derive(Clone)]
pub struct Grammar {
    language: Language,
    ts: tree_sitter::Language,
}

impl Grammar {
    /// Check the grammar's ABI and copy its kind and field tables.
    pub fn new(name: &str, ts: tree_sitter::Language) -> Result<Self, LangError> {
        let version = ts.abi_version();
        if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
            return Err(LangError::IncompatibleAbi {
                name: name.to_owned(),
                version,
                min: MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: LANGUAGE_VERSION,
            });
        }

        let mut descriptor = LanguageDescriptor::new(name).abi_version(version);
        for id in 0..ts.node_kind_count() as KindId {
            let kind = ts.node_kind_for_id(id).unwrap_or_default();
            let named = ts.node_kind_is_named(id);
            // Several symbols may share a name; parsed nodes only ever carry the
            // public one. Unnamed internal symbols keep their ids dense anyway.
            let visible = ts.node_kind_is_visible(id)
                && !kind.is_empty()
                && ts.id_for_node_kind(kind, named) == id;
            descriptor = descriptor.kind(kind, named, visible);
        }
        for id in 1..=ts.field_count() as u16 {
            descriptor = descriptor.field(ts.field_name_for_id(id).unwrap_or_default());
        }

        let language = Language::from_descriptor(descriptor)?;
        Ok(Self { language, ts })
    }

    pub fn name(&self) -> &str {
        self.language.name()
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn ts_language(&self) -> &tree_sitter::Language {
        &self.ts
    }

    /// Map a tree-sitter symbol onto the kind table.
    ///
    /// Internal error symbols outside the table collapse into [`ERROR_KIND`].
    pub(crate) fn kind(&self, id: u16) -> KindId {
        if self.language.has_kind(id) {
            id
        } else {
            ERROR_KIND
        }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name())
            .field("abi_version", &self.language.abi_version())
            .finish()
    }
}
