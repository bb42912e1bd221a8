//! Textual renderings of trees: s-expressions and Graphviz.

use std::fmt::Write as _;
use std::io;

use super::{Node, Tree};

impl Node<'_> {
    /// Parenthesized dump of the named structure under this node.
    ///
    /// Anonymous nodes are left out unless they are missing.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        write_sexp(*self, &mut out);
        out
    }
}

fn is_shown(node: Node<'_>) -> bool {
    node.is_named() || node.is_missing()
}

fn write_sexp(node: Node<'_>, out: &mut String) {
    out.push('(');
    if node.is_missing() {
        out.push_str("MISSING ");
        if node.is_named() {
            out.push_str(node.kind());
        } else {
            let _ = write!(out, "{:?}", node.kind());
        }
    } else {
        out.push_str(node.kind());
    }

    for child in node.children().filter(|c| is_shown(*c)) {
        out.push(' ');
        if let Some(field) = child.field_name() {
            out.push_str(field);
            out.push_str(": ");
        }
        write_sexp(child, out);
    }
    out.push(')');
}

impl Tree {
    /// Write a Graphviz `digraph` of every node, anonymous ones included.
    pub fn print_dot_graph(&self, out: &mut impl io::Write) -> io::Result<()> {
        writeln!(out, "digraph tree {{")?;
        writeln!(out, "  edge [arrowhead=none]")?;

        let mut stack = vec![self.root_node()];
        while let Some(node) = stack.pop() {
            write!(out, "  node_{} [label={}", node.id(), dot_label(node))?;
            if !node.is_named() {
                write!(out, ", shape=plaintext")?;
            }
            if node.is_error() || node.is_missing() {
                write!(out, ", color=red")?;
            }
            if node.is_extra() {
                write!(out, ", fontcolor=gray")?;
            }
            writeln!(out, ", tooltip=\"{}\"]", node.range())?;

            for child in node.children() {
                write!(out, "  node_{} -> node_{}", node.id(), child.id())?;
                if let Some(field) = child.field_name() {
                    write!(out, " [label={}]", dot_quote(field))?;
                }
                writeln!(out)?;
            }
            stack.extend(node.children().rev());
        }

        writeln!(out, "}}")
    }
}

fn dot_label(node: Node<'_>) -> String {
    let kind = if node.is_named() {
        node.kind().to_owned()
    } else {
        format!("\"{}\"", node.kind())
    };
    if node.is_missing() {
        dot_quote(&format!("MISSING {kind}"))
    } else {
        dot_quote(&kind)
    }
}

fn dot_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
