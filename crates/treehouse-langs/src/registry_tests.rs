use arborium_tree_sitter as tree_sitter;

use crate::{LanguageRegistry, available_languages, builtin, language, register_language};

fn ruby() -> tree_sitter::Language {
    arborium_ruby::language().into()
}

#[test]
fn scoped_registry() {
    let mut registry = LanguageRegistry::new();
    assert!(registry.is_empty());

    let grammar = registry.register("rb", ruby()).unwrap();
    assert_eq!(grammar.name(), "rb");
    assert_eq!(registry.len(), 1);
    assert!(registry.get("rb").is_some());
    assert!(registry.get("ruby").is_none());

    // Re-registering replaces the entry.
    let replaced = registry.register("rb", ruby()).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("rb").unwrap().language(), replaced.language());
    assert_ne!(grammar.language(), replaced.language());
    assert_eq!(registry.names().into_iter().collect::<Vec<_>>(), ["rb"]);
}

#[test]
fn global_registry() {
    register_language("registry-test-ruby", ruby()).unwrap();

    assert!(available_languages().contains("registry-test-ruby"));
    let grammar = language("registry-test-ruby").unwrap();
    assert_eq!(grammar.language().name(), "registry-test-ruby");
    assert!(language("registry-test-unknown").is_none());
}

#[test]
fn builtin_grammars() {
    let mut registry = LanguageRegistry::new();
    builtin::register_all(&mut registry).unwrap();
    assert!(registry.get("ruby").is_some());

    let first = builtin::ruby().unwrap();
    let second = builtin::ruby().unwrap();
    assert_eq!(first.language(), second.language());
}
