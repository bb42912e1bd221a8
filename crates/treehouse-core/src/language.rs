//! Grammar descriptors.
//!
//! A [`Language`] is the read-only view every tree and query resolves kind and
//! field names through. It is built once from a [`LanguageDescriptor`], the
//! plain-data form that can also be loaded from JSON.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ERROR_KIND, ERROR_KIND_NAME, FieldId, KindId};

/// One entry of the kind table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDescriptor {
    pub name: String,
    pub named: bool,
    /// Hidden rules and internal sentinels are not visible and never resolve by name.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

/// Plain-data grammar descriptor.
///
/// Kind IDs are positions in `kinds`; field IDs are positions in `fields` plus one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    pub name: String,
    #[serde(default)]
    pub abi_version: usize,
    pub kinds: Vec<KindDescriptor>,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl LanguageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn abi_version(mut self, version: usize) -> Self {
        self.abi_version = version;
        self
    }

    /// Append a visible named kind.
    pub fn named(self, name: impl Into<String>) -> Self {
        self.kind(name, true, true)
    }

    /// Append a visible anonymous kind.
    pub fn anonymous(self, name: impl Into<String>) -> Self {
        self.kind(name, false, true)
    }

    pub fn kind(mut self, name: impl Into<String>, named: bool, visible: bool) -> Self {
        self.kinds.push(KindDescriptor {
            name: name.into(),
            named,
            visible,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("language descriptor has no name")]
    MissingName,

    #[error("kind {id} has an empty name")]
    EmptyKindName { id: usize },

    #[error("too many kinds: {count} (the last ID is reserved for errors)")]
    TooManyKinds { count: usize },

    #[error("field {id} has an empty name")]
    EmptyFieldName { id: usize },

    #[error("field `{name}` is declared more than once")]
    DuplicateField { name: String },

    #[error("too many fields: {count}")]
    TooManyFields { count: usize },

    #[error("invalid language descriptor: {0}")]
    Json(String),
}

impl From<serde_json::Error> for LanguageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Immutable grammar descriptor shared by trees and queries.
///
/// Cloning is cheap; clones compare equal.
#[derive(Clone)]
pub struct Language {
    inner: Arc<LanguageInner>,
}

struct LanguageInner {
    name: String,
    abi_version: usize,
    kinds: Vec<KindDescriptor>,
    named_ids: HashMap<String, KindId>,
    anonymous_ids: HashMap<String, KindId>,
    /// Field name -> position; field ID is position + 1.
    fields: IndexMap<String, ()>,
}

impl Language {
    pub fn from_descriptor(descriptor: LanguageDescriptor) -> Result<Self, LanguageError> {
        let LanguageDescriptor {
            name,
            abi_version,
            kinds,
            fields: field_names,
        } = descriptor;

        if name.is_empty() {
            return Err(LanguageError::MissingName);
        }
        if kinds.len() >= ERROR_KIND as usize {
            return Err(LanguageError::TooManyKinds { count: kinds.len() });
        }
        if field_names.len() >= u16::MAX as usize {
            return Err(LanguageError::TooManyFields {
                count: field_names.len(),
            });
        }

        let mut named_ids = HashMap::new();
        let mut anonymous_ids = HashMap::new();
        for (id, kind) in kinds.iter().enumerate() {
            // The end-of-input sentinel may legitimately be unnamed text;
            // every other kind needs a name to be addressable.
            if kind.name.is_empty() && kind.visible {
                return Err(LanguageError::EmptyKindName { id });
            }
            if !kind.visible {
                continue;
            }
            let ids = if kind.named {
                &mut named_ids
            } else {
                &mut anonymous_ids
            };
            // First visible kind with a name wins.
            ids.entry(kind.name.clone()).or_insert(id as KindId);
        }

        let mut fields = IndexMap::with_capacity(field_names.len());
        for (position, field) in field_names.into_iter().enumerate() {
            if field.is_empty() {
                return Err(LanguageError::EmptyFieldName { id: position + 1 });
            }
            if fields.insert(field.clone(), ()).is_some() {
                return Err(LanguageError::DuplicateField { name: field });
            }
        }

        tracing::debug!(
            language = %name,
            kinds = kinds.len(),
            fields = fields.len(),
            "loaded language"
        );

        Ok(Self {
            inner: Arc::new(LanguageInner {
                name,
                abi_version,
                kinds,
                named_ids,
                anonymous_ids,
                fields,
            }),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, LanguageError> {
        Self::from_descriptor(LanguageDescriptor::from_json(json)?)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn abi_version(&self) -> usize {
        self.inner.abi_version
    }

    /// Number of entries in the kind table (excludes [`ERROR_KIND`]).
    pub fn kind_count(&self) -> usize {
        self.inner.kinds.len()
    }

    /// Whether `id` names a kind of this language, including [`ERROR_KIND`].
    pub fn has_kind(&self, id: KindId) -> bool {
        id == ERROR_KIND || (id as usize) < self.inner.kinds.len()
    }

    pub fn kind_name(&self, id: KindId) -> Option<&str> {
        if id == ERROR_KIND {
            return Some(ERROR_KIND_NAME);
        }
        self.inner.kinds.get(id as usize).map(|k| k.name.as_str())
    }

    pub fn kind_is_named(&self, id: KindId) -> bool {
        if id == ERROR_KIND {
            return true;
        }
        self.inner.kinds.get(id as usize).is_some_and(|k| k.named)
    }

    pub fn kind_is_visible(&self, id: KindId) -> bool {
        if id == ERROR_KIND {
            return true;
        }
        self.inner.kinds.get(id as usize).is_some_and(|k| k.visible)
    }

    /// Resolve a visible kind by name.
    pub fn id_for_kind(&self, name: &str, named: bool) -> Option<KindId> {
        if named && name == ERROR_KIND_NAME {
            return Some(ERROR_KIND);
        }
        let ids = if named {
            &self.inner.named_ids
        } else {
            &self.inner.anonymous_ids
        };
        ids.get(name).copied()
    }

    pub fn field_count(&self) -> usize {
        self.inner.fields.len()
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        let position = self.inner.fields.get_index_of(name)?;
        FieldId::new(position as u16 + 1)
    }

    pub fn field_name_for_id(&self, id: FieldId) -> Option<&str> {
        self.inner
            .fields
            .get_index(id.get() as usize - 1)
            .map(|(name, _)| name.as_str())
    }

    /// All visible named kinds, in ID order.
    pub fn named_kinds(&self) -> impl Iterator<Item = (KindId, &str)> {
        self.inner
            .kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| k.named && k.visible)
            .map(|(id, k)| (id as KindId, k.name.as_str()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.fields.keys().map(String::as_str)
    }

    /// Plain-data copy of this language.
    pub fn to_descriptor(&self) -> LanguageDescriptor {
        LanguageDescriptor {
            name: self.inner.name.clone(),
            abi_version: self.inner.abi_version,
            kinds: self.inner.kinds.clone(),
            fields: self.inner.fields.keys().cloned().collect(),
        }
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.inner.name)
            .field("kinds", &self.inner.kinds.len())
            .field("fields", &self.inner.fields.len())
            .finish()
    }
}
