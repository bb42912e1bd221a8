//! Parser for the pattern language.
//!
//! Recursive descent over a trivia-free token vector. The first error stops
//! parsing; there is no recovery since a broken query is never executed.

pub(crate) mod ast;
pub(crate) mod lexer;

mod grammar;

#[cfg(test)]
mod grammar_tests;

use rowan::{TextRange, TextSize};

use crate::{QueryError, QueryErrorKind};
use lexer::{Token, TokenKind, lex, token_text};

/// Parse `source` into unresolved patterns.
pub(crate) fn parse(source: &str, nesting_limit: u32) -> Result<Vec<ast::Pattern>, QueryError> {
    Parser::new(source, lex(source), nesting_limit).patterns()
}

pub(super) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    depth: u32,
    nesting_limit: u32,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, tokens: Vec<Token>, nesting_limit: u32) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
            nesting_limit,
        }
    }

    fn nth(&self, lookahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + lookahead).map(|t| t.kind)
    }

    fn current(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    fn currently_is(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eof_offset(&self) -> TextSize {
        TextSize::of(self.source)
    }

    /// Span of the current token, or an empty span at the end of input.
    fn current_span(&self) -> TextRange {
        match self.tokens.get(self.pos) {
            Some(token) => token.span,
            None => TextRange::empty(self.eof_offset()),
        }
    }

    fn current_text(&self) -> &'src str {
        match self.tokens.get(self.pos) {
            Some(token) => token_text(self.source, token),
            None => "",
        }
    }

    /// End of the last consumed token.
    fn last_end(&self) -> TextSize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span.end(),
            None => TextSize::from(0),
        }
    }

    fn span_from(&self, start: TextSize) -> TextRange {
        TextRange::new(start, self.last_end().max(start))
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.currently_is(kind) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, QueryError> {
        if self.currently_is(kind) {
            return Ok(self.bump());
        }
        Err(self.unexpected(what))
    }

    fn error(&self, kind: QueryErrorKind, span: TextRange, message: impl Into<String>) -> QueryError {
        QueryError::new(kind, span, message, self.source)
    }

    fn syntax_error(&self, span: TextRange, message: impl Into<String>) -> QueryError {
        self.error(QueryErrorKind::Syntax, span, message)
    }

    /// Error for whatever sits at the current position when `what` was wanted.
    fn unexpected(&self, what: &str) -> QueryError {
        let span = self.current_span();
        let message = match self.current() {
            None => format!("unexpected end of query, expected {what}"),
            Some(TokenKind::Garbage) => {
                format!("unexpected characters `{}`", self.current_text())
            }
            Some(_) => format!("unexpected `{}`, expected {what}", self.current_text()),
        };
        self.syntax_error(span, message)
    }

    fn enter_nesting(&mut self) -> Result<(), QueryError> {
        if self.depth >= self.nesting_limit {
            return Err(self.error(
                QueryErrorKind::NestingLimit,
                self.current_span(),
                format!("patterns nest deeper than {} levels", self.nesting_limit),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }
}
