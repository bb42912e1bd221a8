//! Lexer for the pattern language.
//!
//! Tokens carry spans only; text is sliced from the source on demand.
//! Consecutive unrecognized characters are coalesced into one `Garbage`
//! token, and trivia (whitespace, `;` comments) is dropped.

use std::ops::Range;

use logos::Logos;
use rowan::TextRange;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub(crate) enum TokenKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("!")]
    Negation,

    /// Outranks `Id`, which also matches a lone `_`.
    #[token("_", priority = 3)]
    Underscore,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    /// Anchor, or the rooted-pattern marker at the start of a pattern.
    #[token(".")]
    Dot,

    /// `@` not followed by a name.
    #[token("@")]
    At,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Str,

    #[token("ERROR")]
    KwError,

    #[token("MISSING")]
    KwMissing,

    /// Kind and field names. Keywords win on equal length.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Id,

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Capture,

    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_\-]*[?!]?")]
    Predicate,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,

    Garbage,
}

impl TokenKind {
    fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub(crate) fn quantifier(self) -> Option<crate::CaptureQuantifier> {
        use crate::CaptureQuantifier::*;
        match self {
            TokenKind::Star => Some(ZeroOrMore),
            TokenKind::Plus => Some(OneOrMore),
            TokenKind::Question => Some(ZeroOrOne),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes `source`, dropping trivia.
pub(crate) fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token {
                        kind: TokenKind::Garbage,
                        span: range_to_text_range(start..lexer.span().start),
                    });
                }
                if !kind.is_trivia() {
                    tokens.push(Token {
                        kind,
                        span: range_to_text_range(lexer.span()),
                    });
                }
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token {
                        kind: TokenKind::Garbage,
                        span: range_to_text_range(start..source.len()),
                    });
                }
                break;
            }
        }
    }

    tokens
}

#[inline]
pub(crate) fn token_text<'q>(source: &'q str, token: &Token) -> &'q str {
    &source[Range::<usize>::from(token.span)]
}

/// Contents of a `Str` token with escapes resolved.
pub(crate) fn unescape(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
