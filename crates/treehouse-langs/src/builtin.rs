//! Grammars bundled behind cargo features.

use std::sync::LazyLock;

use crate::{Grammar, LangError, LanguageRegistry};

macro_rules! define_langs {
    (
        $(
            $fn_name:ident => {
                feature: $feature:literal,
                name: $name:literal,
                ts_lang: $ts_lang:expr $(,)?
            }
        ),* $(,)?
    ) => {
        $(
            #[cfg(feature = $feature)]
            pub fn $fn_name() -> Result<Grammar, LangError> {
                static GRAMMAR: LazyLock<Result<Grammar, LangError>> =
                    LazyLock::new(|| Grammar::new($name, $ts_lang.into()));
                GRAMMAR.clone()
            }
        )*

        /// Register every bundled grammar with `registry`.
        pub fn register_all(registry: &mut LanguageRegistry) -> Result<(), LangError> {
            $(
                #[cfg(feature = $feature)]
                registry.register($name, $ts_lang.into())?;
            )*
            let _ = registry;
            Ok(())
        }

        /// Register every bundled grammar in the process-wide registry.
        pub fn register_all_global() -> Result<(), LangError> {
            $(
                #[cfg(feature = $feature)]
                crate::register_language($name, $ts_lang.into())?;
            )*
            Ok(())
        }
    };
}

define_langs! {
    ruby => {
        feature: "lang-ruby",
        name: "ruby",
        ts_lang: arborium_ruby::language(),
    },
}
