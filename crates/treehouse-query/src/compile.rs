//! Resolves parsed patterns against a language.
//!
//! Produces the flat step table, capture table, per-pattern capture
//! quantifiers and predicates that make up a [`Query`].

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use regex_automata::meta::Regex;
use treehouse_core::{ERROR_KIND, FieldId, KindId, Language};

use crate::parser::ast::{self, Name, PredicateArg, StepKind};
use crate::query::{Pattern, Query};
use crate::step::{Matcher, Slot, Step, StepId};
use crate::{CaptureQuantifier, QueryError, QueryErrorKind, QueryPredicate, QueryPredicateArg, TextPredicate};

pub(crate) fn compile(
    language: &Language,
    source: &str,
    patterns: &[ast::Pattern],
) -> Result<Query, QueryError> {
    let mut compiler = Compiler {
        language,
        source,
        steps: Vec::new(),
        captures: IndexSet::new(),
    };

    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        compiled.push(compiler.pattern(pattern)?);
    }

    let capture_count = compiler.captures.len();
    for pattern in &mut compiled {
        pattern.capture_quantifiers = compiler.capture_quantifiers(pattern.root, capture_count);
    }
    let guaranteed = compiler.guaranteed_steps(&compiled);

    Ok(Query::from_parts(
        language.clone(),
        compiler.steps,
        compiled,
        compiler.captures,
        guaranteed,
    ))
}

enum CompiledPredicate {
    Text(TextPredicate),
    General(QueryPredicate),
}

struct Compiler<'a> {
    language: &'a Language,
    source: &'a str,
    steps: Vec<Step>,
    captures: IndexSet<String>,
}

impl Compiler<'_> {
    fn error(&self, kind: QueryErrorKind, span: rowan::TextRange, message: String) -> QueryError {
        QueryError::new(kind, span, message, self.source)
    }

    fn pattern(&mut self, pattern: &ast::Pattern) -> Result<Pattern, QueryError> {
        let first = self.steps.len() as StepId;
        let root = self.step(&pattern.root, None, false)?;
        let end = self.steps.len() as StepId;

        let bound: HashSet<u32> = self.steps[first as usize..end as usize]
            .iter()
            .flat_map(|step| step.captures.iter().copied())
            .collect();

        let mut text_predicates = Vec::new();
        let mut general_predicates = Vec::new();
        for predicate in &pattern.predicates {
            match self.predicate(predicate, &bound)? {
                CompiledPredicate::Text(p) => text_predicates.push(p),
                CompiledPredicate::General(p) => general_predicates.push(p),
            }
        }

        Ok(Pattern {
            root,
            steps: first..end,
            start_byte: pattern.span.start().into(),
            end_byte: pattern.span.end().into(),
            rooted: pattern.rooted,
            non_local: matches!(pattern.root.kind, StepKind::Alternation(_)),
            capture_quantifiers: Vec::new(),
            text_predicates,
            general_predicates,
        })
    }

    fn step(
        &mut self,
        ast: &ast::Step,
        parent: Option<StepId>,
        optional_scope: bool,
    ) -> Result<StepId, QueryError> {
        let id = self.steps.len() as StepId;
        // A quantifier on a pattern root does not make its children optional.
        let optional = optional_scope || (parent.is_some() && ast.quantifier.is_optional());
        self.steps.push(Step {
            parent,
            matcher: Matcher::Any,
            quantifier: ast.quantifier,
            field: None,
            negated_fields: Vec::new(),
            captures: Vec::new(),
            slots: Vec::new(),
            anchor_last: ast.anchor_last,
            optional,
        });

        let field = ast.field.as_ref().map(|name| self.field(name)).transpose()?;
        let matcher = match &ast.kind {
            StepKind::Named(name) => Matcher::Kind(self.kind(name, true)?),
            StepKind::Literal(name) => Matcher::Kind(self.kind(name, false)?),
            StepKind::Wildcard => Matcher::Any,
            StepKind::NamedWildcard => Matcher::AnyNamed,
            StepKind::Error => Matcher::Kind(ERROR_KIND),
            StepKind::Missing(target) => Matcher::Missing(
                target
                    .as_ref()
                    .map(|t| self.kind(&t.name, t.named))
                    .transpose()?,
            ),
            StepKind::Alternation(branches) => {
                let mut ids = Vec::with_capacity(branches.len());
                for branch in branches {
                    ids.push(self.step(branch, Some(id), optional)?);
                }
                Matcher::Alternation(ids)
            }
        };

        let mut negated_fields = Vec::with_capacity(ast.negated_fields.len());
        for name in &ast.negated_fields {
            negated_fields.push(self.field(name)?);
        }

        let mut slots = Vec::with_capacity(ast.children.len());
        for child in &ast.children {
            let step = self.step(&child.step, Some(id), optional)?;
            let slot = &self.steps[step as usize];
            if let Some(field) = slot.field
                && !child.step.quantifier.is_optional()
                && negated_fields.contains(&field)
            {
                return Err(self.error(
                    QueryErrorKind::Structure,
                    child.step.span,
                    format!(
                        "field `{}` is both required and negated",
                        self.language.field_name_for_id(field).unwrap_or_default()
                    ),
                ));
            }
            slots.push(Slot {
                step,
                anchored: child.anchored,
            });
        }

        let captures = ast
            .captures
            .iter()
            .map(|name| self.captures.insert_full(name.text.clone()).0 as u32)
            .collect();

        let step = &mut self.steps[id as usize];
        step.matcher = matcher;
        step.field = field;
        step.negated_fields = negated_fields;
        step.slots = slots;
        step.captures = captures;
        Ok(id)
    }

    fn kind(&self, name: &Name, named: bool) -> Result<KindId, QueryError> {
        self.language.id_for_kind(&name.text, named).ok_or_else(|| {
            let shown = if named {
                format!("`{}`", name.text)
            } else {
                format!("\"{}\"", name.text)
            };
            self.error(QueryErrorKind::NodeType, name.span, format!("invalid node type {shown}"))
        })
    }

    fn field(&self, name: &Name) -> Result<FieldId, QueryError> {
        self.language.field_id_for_name(&name.text).ok_or_else(|| {
            self.error(
                QueryErrorKind::Field,
                name.span,
                format!("invalid field name `{}`", name.text),
            )
        })
    }

    fn bound_capture(&self, name: &Name, bound: &HashSet<u32>) -> Result<u32, QueryError> {
        match self.captures.get_index_of(name.text.as_str()) {
            Some(index) if bound.contains(&(index as u32)) => Ok(index as u32),
            _ => Err(self.error(
                QueryErrorKind::Capture,
                name.span,
                format!("capture `@{}` is not defined in this pattern", name.text),
            )),
        }
    }

    fn predicate(
        &self,
        predicate: &ast::Predicate,
        bound: &HashSet<u32>,
    ) -> Result<CompiledPredicate, QueryError> {
        let operator = predicate.name.text.as_str();
        let arity_error = |expected: &str| {
            self.error(
                QueryErrorKind::Predicate,
                predicate.span,
                format!(
                    "`#{operator}` expects {expected}, got {} argument(s)",
                    predicate.args.len()
                ),
            )
        };
        let first_capture = || match predicate.args.first() {
            Some(PredicateArg::Capture(name)) => self.bound_capture(name, bound),
            Some(PredicateArg::String(name)) => Err(self.error(
                QueryErrorKind::Predicate,
                name.span,
                format!("first argument of `#{operator}` must be a capture"),
            )),
            None => Err(arity_error("a capture")),
        };

        let positive = !operator.starts_with("not-") && !operator.starts_with("any-not-");
        let match_all = !operator.starts_with("any-");

        match operator {
            "eq?" | "not-eq?" | "any-eq?" | "any-not-eq?" => {
                if predicate.args.len() != 2 {
                    return Err(arity_error("2 arguments"));
                }
                let capture = first_capture()?;
                Ok(CompiledPredicate::Text(match &predicate.args[1] {
                    PredicateArg::Capture(name) => TextPredicate::EqCapture {
                        capture,
                        other: self.bound_capture(name, bound)?,
                        positive,
                        match_all,
                    },
                    PredicateArg::String(value) => TextPredicate::EqString {
                        capture,
                        value: value.text.as_str().into(),
                        positive,
                        match_all,
                    },
                }))
            }
            "match?" | "not-match?" | "any-match?" | "any-not-match?" => {
                if predicate.args.len() != 2 {
                    return Err(arity_error("2 arguments"));
                }
                let capture = first_capture()?;
                let PredicateArg::String(pattern) = &predicate.args[1] else {
                    return Err(self.error(
                        QueryErrorKind::Predicate,
                        predicate.span,
                        format!("second argument of `#{operator}` must be a string"),
                    ));
                };
                let regex = Regex::new(&pattern.text).map_err(|err| {
                    self.error(
                        QueryErrorKind::Predicate,
                        pattern.span,
                        format!("invalid regular expression: {err}"),
                    )
                })?;
                Ok(CompiledPredicate::Text(TextPredicate::MatchString {
                    capture,
                    regex,
                    positive,
                    match_all,
                }))
            }
            "any-of?" | "not-any-of?" => {
                if predicate.args.len() < 2 {
                    return Err(arity_error("at least 2 arguments"));
                }
                let capture = first_capture()?;
                let mut values = Vec::with_capacity(predicate.args.len() - 1);
                for arg in &predicate.args[1..] {
                    match arg {
                        PredicateArg::String(value) => values.push(value.text.as_str().into()),
                        PredicateArg::Capture(name) => {
                            return Err(self.error(
                                QueryErrorKind::Predicate,
                                name.span,
                                format!("`#{operator}` compares against strings, not captures"),
                            ));
                        }
                    }
                }
                Ok(CompiledPredicate::Text(TextPredicate::AnyString {
                    capture,
                    values,
                    positive,
                }))
            }
            _ => {
                let mut args = Vec::with_capacity(predicate.args.len());
                for arg in &predicate.args {
                    args.push(match arg {
                        PredicateArg::Capture(name) => {
                            QueryPredicateArg::Capture(self.bound_capture(name, bound)?)
                        }
                        PredicateArg::String(value) => QueryPredicateArg::String(value.text.as_str().into()),
                    });
                }
                Ok(CompiledPredicate::General(QueryPredicate {
                    operator: operator.into(),
                    args,
                }))
            }
        }
    }

    /// Quantifier of every capture in the subtree of `id`, counting `id` once.
    fn subtree_quantifiers(&self, id: StepId) -> HashMap<u32, CaptureQuantifier> {
        let step = &self.steps[id as usize];
        let mut out = HashMap::new();
        for &capture in &step.captures {
            add_quantifier(&mut out, capture, CaptureQuantifier::One);
        }

        let mut joined: Option<HashMap<u32, CaptureQuantifier>> = None;
        for &branch in step.branches() {
            let scale = self.steps[branch as usize].quantifier;
            let current: HashMap<_, _> = self
                .subtree_quantifiers(branch)
                .into_iter()
                .map(|(capture, q)| (capture, q.mul(scale)))
                .collect();
            joined = Some(match joined {
                None => current,
                Some(previous) => join_quantifiers(previous, current),
            });
        }
        for (capture, q) in joined.unwrap_or_default() {
            add_quantifier(&mut out, capture, q);
        }

        for slot in &step.slots {
            let scale = self.steps[slot.step as usize].quantifier;
            for (capture, q) in self.subtree_quantifiers(slot.step) {
                add_quantifier(&mut out, capture, q.mul(scale));
            }
        }
        out
    }

    fn capture_quantifiers(&self, root: StepId, capture_count: usize) -> Vec<CaptureQuantifier> {
        let scale = self.steps[root as usize].quantifier;
        let mut out = vec![CaptureQuantifier::Zero; capture_count];
        for (capture, q) in self.subtree_quantifiers(root) {
            out[capture as usize] = q.mul(scale);
        }
        out
    }

    /// A step is guaranteed when reaching it means the match will be
    /// reported: no text predicates, every later step of the pattern can
    /// match zero times, and no enclosing step restricts trailing children.
    fn guaranteed_steps(&self, patterns: &[Pattern]) -> Vec<bool> {
        let mut out = vec![false; self.steps.len()];
        for pattern in patterns {
            if !pattern.text_predicates.is_empty() {
                continue;
            }
            let mut later_optional = true;
            for id in pattern.steps.clone().rev() {
                out[id as usize] = later_optional && !self.anchored_last_on_path(id);
                later_optional &= self.steps[id as usize].optional;
            }
        }
        out
    }

    fn anchored_last_on_path(&self, mut id: StepId) -> bool {
        loop {
            let step = &self.steps[id as usize];
            if step.anchor_last {
                return true;
            }
            match step.parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

fn add_quantifier(map: &mut HashMap<u32, CaptureQuantifier>, capture: u32, q: CaptureQuantifier) {
    let entry = map.entry(capture).or_insert(CaptureQuantifier::Zero);
    *entry = entry.add(q);
}

fn join_quantifiers(
    mut left: HashMap<u32, CaptureQuantifier>,
    right: HashMap<u32, CaptureQuantifier>,
) -> HashMap<u32, CaptureQuantifier> {
    for (capture, q) in left.iter_mut() {
        *q = q.join(right.get(capture).copied().unwrap_or(CaptureQuantifier::Zero));
    }
    for (capture, q) in right {
        left.entry(capture)
            .or_insert_with(|| q.join(CaptureQuantifier::Zero));
    }
    left
}
