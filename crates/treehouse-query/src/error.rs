//! Query compilation errors.

use std::fmt;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;
use treehouse_core::Point;

/// Category of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    Syntax,
    NodeType,
    Field,
    Capture,
    Predicate,
    Structure,
    NestingLimit,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Syntax => "syntax error",
            Self::NodeType => "invalid node type",
            Self::Field => "invalid field",
            Self::Capture => "invalid capture",
            Self::Predicate => "invalid predicate",
            Self::Structure => "impossible pattern",
            Self::NestingLimit => "nesting too deep",
        })
    }
}

/// Failure to compile a query, located in the query source.
///
/// `row` and `column` are 0-indexed; `column` counts bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {}:{}: {message}", .row + 1, .column + 1)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub offset: usize,
    pub row: usize,
    pub column: usize,
    pub message: String,
    span: TextRange,
}

impl QueryError {
    pub(crate) fn new(
        kind: QueryErrorKind,
        span: TextRange,
        message: impl Into<String>,
        source: &str,
    ) -> Self {
        let offset: usize = span.start().into();
        let Point { row, column } = Point::for_byte(source.as_bytes(), offset);
        Self {
            kind,
            offset,
            row,
            column,
            message: message.into(),
            span,
        }
    }

    /// Byte range of the offending text.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.span.into()
    }

    /// Render the error against the query `source` it came from.
    pub fn render(&self, source: &str) -> String {
        self.render_with(source, Renderer::plain())
    }

    /// Like [`render`](Self::render), with ANSI colors.
    pub fn render_colored(&self, source: &str) -> String {
        self.render_with(source, Renderer::styled())
    }

    fn render_with(&self, source: &str, renderer: Renderer) -> String {
        let range = adjust_range(self.span, source.len());
        let title = self.kind.to_string();
        let snippet = Snippet::source(source).line_start(1).annotation(
            AnnotationKind::Primary
                .span(range)
                .label(self.message.as_str()),
        );
        let report: Vec<Group> = vec![Level::ERROR.primary_title(title.as_str()).element(snippet)];
        renderer.render(&report).to_string()
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = usize::from(range.start()).min(limit);
    let end: usize = usize::from(range.end()).min(limit);

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}
