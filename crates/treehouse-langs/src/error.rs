use treehouse_core::{BuildError, LanguageError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LangError {
    #[error("grammar `{name}` has ABI version {version}, supported range is {min}..={max}")]
    IncompatibleAbi {
        name: String,
        version: usize,
        min: usize,
        max: usize,
    },

    #[error("language `{0}` is not registered")]
    NotRegistered(String),

    #[error("no language set on parser")]
    NoLanguage,

    #[error("parse aborted")]
    Aborted,

    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error("malformed parse tree: {0}")]
    Build(#[from] BuildError),
}
