use indoc::indoc;

use super::ast::{Pattern, PredicateArg, StepKind};
use super::parse;
use crate::{CaptureQuantifier, DEFAULT_NESTING_LIMIT, QueryError, QueryErrorKind};

fn parse_ok(source: &str) -> Vec<Pattern> {
    parse(source, DEFAULT_NESTING_LIMIT).unwrap()
}

fn parse_err(source: &str) -> QueryError {
    parse(source, DEFAULT_NESTING_LIMIT).unwrap_err()
}

fn kind_name(kind: &StepKind) -> String {
    match kind {
        StepKind::Named(name) => format!("({})", name.text),
        StepKind::Literal(name) => format!("{:?}", name.text),
        StepKind::Wildcard => "_".to_owned(),
        StepKind::NamedWildcard => "(_)".to_owned(),
        StepKind::Error => "(ERROR)".to_owned(),
        StepKind::Missing(None) => "(MISSING)".to_owned(),
        StepKind::Missing(Some(target)) if target.named => format!("(MISSING {})", target.name.text),
        StepKind::Missing(Some(target)) => format!("(MISSING {:?})", target.name.text),
        StepKind::Alternation(branches) => format!("[{}]", branches.len()),
    }
}

#[test]
fn node_with_fields_and_captures() {
    let patterns = parse_ok("(class name: (constant) @name (body_statement)* @body)");
    assert_eq!(patterns.len(), 1);

    let root = &patterns[0].root;
    assert_eq!(kind_name(&root.kind), "(class)");
    assert_eq!(root.children.len(), 2);

    let name = &root.children[0].step;
    assert_eq!(name.field.as_ref().unwrap().text, "name");
    assert_eq!(name.captures[0].text, "name");
    assert_eq!(name.quantifier, CaptureQuantifier::One);

    let body = &root.children[1].step;
    assert!(body.field.is_none());
    assert_eq!(body.quantifier, CaptureQuantifier::ZeroOrMore);
    assert_eq!(body.captures[0].text, "body");
}

#[test]
fn pattern_spans() {
    let patterns = parse_ok("(a)\n\n(b) @x\n");
    let spans: Vec<_> = patterns
        .iter()
        .map(|p| (u32::from(p.span.start()), u32::from(p.span.end())))
        .collect();
    assert_eq!(spans, [(0, 3), (5, 11)]);
}

#[test]
fn step_kinds() {
    let patterns = parse_ok(r#""end" _ (_) (ERROR) (MISSING) (MISSING identifier) (MISSING ")") [(a) "b"]"#);
    let kinds: Vec<_> = patterns.iter().map(|p| kind_name(&p.root.kind)).collect();
    assert_eq!(
        kinds,
        [
            r#""end""#,
            "_",
            "(_)",
            "(ERROR)",
            "(MISSING)",
            "(MISSING identifier)",
            r#"(MISSING ")")"#,
            "[2]",
        ]
    );
}

#[test]
fn anchors() {
    let patterns = parse_ok("(a . (b) . (c) .) (a (b) (c))");

    let anchored = &patterns[0].root;
    assert!(anchored.children.iter().all(|c| c.anchored));
    assert!(anchored.anchor_last);

    let plain = &patterns[1].root;
    assert!(plain.children.iter().all(|c| !c.anchored));
    assert!(!plain.anchor_last);
}

#[test]
fn rooted_marker() {
    let patterns = parse_ok(". (a) (b)");
    assert!(patterns[0].rooted);
    assert!(!patterns[1].rooted);
}

#[test]
fn negated_fields() {
    let patterns = parse_ok("(method !parameters !body (identifier))");
    let root = &patterns[0].root;
    let negated: Vec<_> = root.negated_fields.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(negated, ["parameters", "body"]);
    assert_eq!(root.children.len(), 1);
}

#[test]
fn predicates_collect_from_every_position() {
    let source = indoc! {r#"
        ((identifier) @id (#eq? @id "foo"))
        (identifier) @id (#match? @id "^b") (#set! kind method)
        (method name: (identifier) @n (#eq? @n "bar"))
    "#};
    let patterns = parse_ok(source);
    assert_eq!(patterns.len(), 3);

    let grouped = &patterns[0];
    assert_eq!(kind_name(&grouped.root.kind), "(identifier)");
    assert_eq!(grouped.root.captures[0].text, "id");
    assert_eq!(grouped.predicates.len(), 1);
    assert_eq!(grouped.predicates[0].name.text, "eq?");
    assert!(matches!(&grouped.predicates[0].args[0], PredicateArg::Capture(n) if n.text == "id"));
    assert!(matches!(&grouped.predicates[0].args[1], PredicateArg::String(n) if n.text == "foo"));

    let trailing = &patterns[1];
    let names: Vec<_> = trailing.predicates.iter().map(|p| p.name.text.as_str()).collect();
    assert_eq!(names, ["match?", "set!"]);
    assert!(matches!(&trailing.predicates[1].args[1], PredicateArg::String(n) if n.text == "method"));

    assert_eq!(patterns[2].predicates.len(), 1);
}

#[test]
fn group_suffixes_apply_to_inner_step() {
    let patterns = parse_ok("((identifier) @a)* @b");
    let root = &patterns[0].root;
    assert_eq!(root.quantifier, CaptureQuantifier::ZeroOrMore);
    let captures: Vec<_> = root.captures.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(captures, ["a", "b"]);
}

#[test]
fn alternation_branches() {
    let patterns = parse_ok("[(class) name: (constant) \"end\"] @def");
    let root = &patterns[0].root;
    let StepKind::Alternation(branches) = &root.kind else {
        panic!("expected alternation");
    };
    assert_eq!(branches.len(), 3);
    assert_eq!(branches[1].field.as_ref().unwrap().text, "name");
    assert_eq!(root.captures[0].text, "def");
}

#[test]
fn comments_are_ignored() {
    let source = indoc! {"
        ; leading comment
        (a) ; trailing
        ; end
    "};
    assert_eq!(parse_ok(source).len(), 1);
}

#[test]
fn empty_query() {
    assert!(parse_ok("").is_empty());
    assert!(parse_ok("  ; nothing\n").is_empty());
}

#[test]
fn syntax_errors() {
    let cases = [
        ("(a", "unclosed parenthesis"),
        ("(a))", "unexpected `)`"),
        ("()", "empty pattern"),
        ("(a) @", "`@` must be followed"),
        ("* (a)", "quantifier without a preceding pattern"),
        ("(a) @x *", "quantifiers must come before captures"),
        ("(a)*?", "already has a quantifier"),
        ("((a) (b))", "sibling sequences"),
        ("(a b)", "bare identifier `b`"),
        ("[]", "empty alternation"),
        ("[(a)", "unclosed bracket"),
        ("(a name:)", "not followed by a pattern"),
        ("(a) $", "unexpected characters `$`"),
        (r#"(#eq? @a "b")"#, "predicate must follow a pattern"),
        ("(a !)", "a field name after `!`"),
        ("(a) (#eq? @a (b))", "invalid predicate argument"),
    ];
    for (source, needle) in cases {
        let err = parse_err(source);
        assert_eq!(err.kind, QueryErrorKind::Syntax, "{source}");
        assert!(err.message.contains(needle), "{source}: {}", err.message);
    }
}

#[test]
fn structure_errors() {
    for source in ["(a) .", "[(a) . (b)]", "((a) .)", "(MISSING identifier (b))"] {
        let err = parse_err(source);
        assert_eq!(err.kind, QueryErrorKind::Structure, "{source}");
    }
}

#[test]
fn error_positions() {
    let err = parse_err("(a)\n  (b (c)");
    assert_eq!(err.offset, 6);
    assert_eq!((err.row, err.column), (1, 2));
}

#[test]
fn nesting_limit() {
    let source = "(a (b (c)))";
    assert!(parse(source, 3).is_ok());

    let err = parse(source, 2).unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::NestingLimit);
    assert_eq!(err.offset, 6);
}
