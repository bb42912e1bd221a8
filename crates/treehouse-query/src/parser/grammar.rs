//! Grammar productions.
//!
//! ```text
//! pattern   = "."? step predicate*
//! step      = (field ":")? ( node | string | "_" | alternation | group ) quantifier? capture*
//! node      = "(" ( Id | "_" | "ERROR" ) ( step | "." | "!" Id | predicate )* ")"
//!           | "(" "MISSING" ( Id | string )? ")"
//! group     = "(" step predicate* ")"
//! predicate = "(" "#name" ( capture | string | Id )* ")"
//! ```

use super::Parser;
use super::ast::{Child, MissingTarget, Name, Pattern, Predicate, PredicateArg, Step, StepKind};
use super::lexer::{Token, TokenKind, token_text, unescape};
use crate::{CaptureQuantifier, QueryError, QueryErrorKind};

type ParseResult<T> = Result<T, QueryError>;

impl Parser<'_> {
    pub(super) fn patterns(mut self) -> ParseResult<Vec<Pattern>> {
        let mut patterns = Vec::new();
        while !self.eof() {
            patterns.push(self.pattern()?);
        }
        Ok(patterns)
    }

    fn pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.current_span().start();
        let rooted = self.eat(TokenKind::Dot);
        if self.at_predicate() {
            return Err(self.syntax_error(self.current_span(), "predicate must follow a pattern"));
        }

        let (root, mut predicates) = self.step()?;
        while self.at_predicate() {
            predicates.push(self.predicate()?);
        }
        if self.currently_is(TokenKind::Dot) {
            return Err(self.stray_anchor());
        }

        Ok(Pattern {
            rooted,
            root,
            predicates,
            span: self.span_from(start),
        })
    }

    fn at_predicate(&self) -> bool {
        self.currently_is(TokenKind::ParenOpen) && self.nth(1) == Some(TokenKind::Predicate)
    }

    fn step(&mut self) -> ParseResult<(Step, Vec<Predicate>)> {
        self.enter_nesting()?;
        let start = self.current_span().start();
        let field = self.field_prefix()?;

        let span = self.current_span();
        let (mut step, predicates) = match self.current() {
            Some(TokenKind::ParenOpen)
                if matches!(
                    self.nth(1),
                    Some(TokenKind::ParenOpen | TokenKind::BracketOpen | TokenKind::Str)
                ) =>
            {
                self.group()?
            }
            Some(TokenKind::ParenOpen) => self.node()?,
            Some(TokenKind::BracketOpen) => self.alternation()?,
            Some(TokenKind::Str) => {
                let token = self.bump();
                let literal = StepKind::Literal(self.string(token));
                (Step::new(literal, token.span), Vec::new())
            }
            Some(TokenKind::Underscore) => {
                self.bump();
                (Step::new(StepKind::Wildcard, span), Vec::new())
            }
            Some(TokenKind::Star | TokenKind::Plus | TokenKind::Question) => {
                return Err(self.syntax_error(span, "quantifier without a preceding pattern"));
            }
            Some(TokenKind::Capture | TokenKind::At) => {
                return Err(self.syntax_error(span, "capture without a preceding pattern"));
            }
            Some(TokenKind::Id) => {
                let text = self.current_text();
                return Err(self.syntax_error(
                    span,
                    format!("bare identifier `{text}`; node patterns are written `({text})`"),
                ));
            }
            _ => return Err(self.unexpected("a pattern")),
        };

        if let Some(field) = field {
            if step.field.is_some() {
                return Err(self.syntax_error(field.span, "pattern already has a field"));
            }
            step.field = Some(field);
        }
        self.suffix(&mut step)?;
        step.span = self.span_from(start);

        self.exit_nesting();
        Ok((step, predicates))
    }

    fn field_prefix(&mut self) -> ParseResult<Option<Name>> {
        if !(self.currently_is(TokenKind::Id) && self.nth(1) == Some(TokenKind::Colon)) {
            return Ok(None);
        }
        let token = self.bump();
        let name = self.name(token);
        self.bump();

        if matches!(
            self.current(),
            None | Some(TokenKind::ParenClose | TokenKind::BracketClose)
        ) {
            return Err(self.syntax_error(
                name.span,
                format!("field `{}` is not followed by a pattern", name.text),
            ));
        }
        Ok(Some(name))
    }

    fn node(&mut self) -> ParseResult<(Step, Vec<Predicate>)> {
        let open = self.bump();
        let kind = match self.current() {
            Some(TokenKind::Id) => {
                let token = self.bump();
                StepKind::Named(self.name(token))
            }
            Some(TokenKind::Underscore) => {
                self.bump();
                StepKind::NamedWildcard
            }
            Some(TokenKind::KwError) => {
                self.bump();
                StepKind::Error
            }
            Some(TokenKind::KwMissing) => {
                self.bump();
                return self.missing(open);
            }
            Some(TokenKind::ParenClose) => {
                let span = open.span.cover(self.current_span());
                return Err(self.syntax_error(span, "empty pattern `()`"));
            }
            Some(TokenKind::Predicate) => {
                return Err(self.syntax_error(self.current_span(), "predicate must follow a pattern"));
            }
            _ => return Err(self.unexpected("a node kind")),
        };

        let mut step = Step::new(kind, open.span);
        let mut predicates = Vec::new();
        let mut anchored = false;
        loop {
            match self.current() {
                Some(TokenKind::ParenClose) => {
                    self.bump();
                    break;
                }
                None => return Err(self.syntax_error(open.span, "unclosed parenthesis")),
                Some(TokenKind::Dot) => {
                    self.bump();
                    anchored = true;
                }
                Some(TokenKind::Negation) => {
                    self.bump();
                    let token = self.expect(TokenKind::Id, "a field name after `!`")?;
                    step.negated_fields.push(self.name(token));
                }
                Some(TokenKind::ParenOpen) if self.nth(1) == Some(TokenKind::Predicate) => {
                    predicates.push(self.predicate()?);
                }
                _ => {
                    let (child, nested) = self.step()?;
                    predicates.extend(nested);
                    step.children.push(Child {
                        anchored,
                        step: child,
                    });
                    anchored = false;
                }
            }
        }
        step.anchor_last = anchored;

        Ok((step, predicates))
    }

    fn missing(&mut self, open: Token) -> ParseResult<(Step, Vec<Predicate>)> {
        let target = match self.current() {
            Some(TokenKind::Id) => {
                let token = self.bump();
                Some(MissingTarget {
                    name: self.name(token),
                    named: true,
                })
            }
            Some(TokenKind::Str) => {
                let token = self.bump();
                Some(MissingTarget {
                    name: self.string(token),
                    named: false,
                })
            }
            _ => None,
        };

        match self.current() {
            Some(TokenKind::ParenClose) => {
                self.bump();
            }
            None => return Err(self.syntax_error(open.span, "unclosed parenthesis")),
            Some(_) => {
                return Err(self.error(
                    QueryErrorKind::Structure,
                    self.current_span(),
                    "MISSING patterns cannot have children",
                ));
            }
        }

        Ok((Step::new(StepKind::Missing(target), open.span), Vec::new()))
    }

    /// Parenthesized step, optionally followed by predicates: `((a) @x (#eq? @x "y"))`.
    fn group(&mut self) -> ParseResult<(Step, Vec<Predicate>)> {
        let open = self.bump();
        let mut steps = Vec::new();
        let mut predicates = Vec::new();
        loop {
            match self.current() {
                Some(TokenKind::ParenClose) => {
                    self.bump();
                    break;
                }
                None => return Err(self.syntax_error(open.span, "unclosed parenthesis")),
                Some(TokenKind::Dot) => return Err(self.stray_anchor()),
                Some(TokenKind::ParenOpen) if self.nth(1) == Some(TokenKind::Predicate) => {
                    predicates.push(self.predicate()?);
                }
                _ => {
                    let (step, nested) = self.step()?;
                    predicates.extend(nested);
                    steps.push(step);
                }
            }
        }

        if steps.len() > 1 {
            return Err(self.syntax_error(
                self.span_from(open.span.start()),
                "sibling sequences are not supported; wrap the patterns in a parent node",
            ));
        }
        let Some(step) = steps.pop() else {
            return Err(self.syntax_error(self.span_from(open.span.start()), "group contains no pattern"));
        };
        Ok((step, predicates))
    }

    fn alternation(&mut self) -> ParseResult<(Step, Vec<Predicate>)> {
        let open = self.bump();
        let mut branches = Vec::new();
        let mut predicates = Vec::new();
        loop {
            match self.current() {
                Some(TokenKind::BracketClose) => {
                    self.bump();
                    break;
                }
                None => return Err(self.syntax_error(open.span, "unclosed bracket")),
                Some(TokenKind::Dot) => return Err(self.stray_anchor()),
                Some(TokenKind::ParenOpen) if self.nth(1) == Some(TokenKind::Predicate) => {
                    predicates.push(self.predicate()?);
                }
                _ => {
                    let (branch, nested) = self.step()?;
                    predicates.extend(nested);
                    branches.push(branch);
                }
            }
        }

        if branches.is_empty() {
            return Err(self.syntax_error(self.span_from(open.span.start()), "empty alternation"));
        }
        Ok((Step::new(StepKind::Alternation(branches), open.span), predicates))
    }

    fn suffix(&mut self, step: &mut Step) -> ParseResult<()> {
        if let Some(quantifier) = self.current().and_then(TokenKind::quantifier) {
            if step.quantifier != CaptureQuantifier::One {
                return Err(self.syntax_error(self.current_span(), "pattern already has a quantifier"));
            }
            self.bump();
            step.quantifier = quantifier;
        }

        loop {
            let span = self.current_span();
            match self.current() {
                Some(TokenKind::Capture) => {
                    let token = self.bump();
                    step.captures.push(self.capture(token));
                }
                Some(TokenKind::At) => {
                    return Err(self.syntax_error(span, "`@` must be followed by a capture name"));
                }
                Some(TokenKind::Star | TokenKind::Plus | TokenKind::Question) => {
                    let message = if step.captures.is_empty() {
                        "pattern already has a quantifier"
                    } else {
                        "quantifiers must come before captures"
                    };
                    return Err(self.syntax_error(span, message));
                }
                _ => return Ok(()),
            }
        }
    }

    fn predicate(&mut self) -> ParseResult<Predicate> {
        let open = self.bump();
        let token = self.bump();
        let name = Name {
            text: token_text(self.source, &token)[1..].to_owned(),
            span: token.span,
        };

        let mut args = Vec::new();
        loop {
            let span = self.current_span();
            match self.current() {
                Some(TokenKind::ParenClose) => {
                    self.bump();
                    break;
                }
                None => return Err(self.syntax_error(open.span, "unclosed parenthesis")),
                Some(TokenKind::Capture) => {
                    let token = self.bump();
                    args.push(PredicateArg::Capture(self.capture(token)));
                }
                Some(TokenKind::Str) => {
                    let token = self.bump();
                    args.push(PredicateArg::String(self.string(token)));
                }
                Some(TokenKind::Id) => {
                    let token = self.bump();
                    args.push(PredicateArg::String(self.name(token)));
                }
                Some(TokenKind::At) => {
                    return Err(self.syntax_error(span, "`@` must be followed by a capture name"));
                }
                Some(_) => {
                    return Err(self.syntax_error(
                        span,
                        format!("invalid predicate argument `{}`", self.current_text()),
                    ));
                }
            }
        }

        Ok(Predicate {
            name,
            args,
            span: self.span_from(open.span.start()),
        })
    }

    fn stray_anchor(&self) -> QueryError {
        self.error(
            QueryErrorKind::Structure,
            self.current_span(),
            "anchors must appear between the children of a node pattern",
        )
    }

    fn name(&self, token: Token) -> Name {
        Name {
            text: token_text(self.source, &token).to_owned(),
            span: token.span,
        }
    }

    fn string(&self, token: Token) -> Name {
        Name {
            text: unescape(token_text(self.source, &token)),
            span: token.span,
        }
    }

    fn capture(&self, token: Token) -> Name {
        Name {
            text: token_text(self.source, &token)[1..].to_owned(),
            span: token.span,
        }
    }
}
