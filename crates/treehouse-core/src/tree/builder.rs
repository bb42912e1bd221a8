//! Incremental construction of [`Tree`]s.
//!
//! Nodes are fed in pre-order: `open` a node, feed its children, `close` it.
//! Leaves can be added in one step with `leaf`. Every structural invariant of
//! the finished tree is checked as nodes arrive.

use super::{NodeFlags, NodeRecord, Tree};
use crate::{ERROR_KIND, FieldId, KindId, Language, Point};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("unknown kind id {kind}")]
    UnknownKind { kind: KindId },

    #[error("unknown field id {field}")]
    UnknownField { field: FieldId },

    #[error("node {index} ends before it starts")]
    InvertedRange { index: usize },

    #[error("node {index} overlaps its previous sibling")]
    SiblingOverlap { index: usize },

    #[error("node {index} extends outside its parent")]
    OutsideParent { index: usize },

    #[error("`close` called with no open node")]
    UnbalancedClose,

    #[error("{open} node(s) still open")]
    Unclosed { open: usize },

    #[error("a tree has exactly one root")]
    MultipleRoots,

    #[error("tree has no nodes")]
    Empty,
}

/// Start-of-node description passed to [`TreeBuilder::open`].
#[derive(Debug, Clone, Copy)]
pub struct NodeSpec {
    kind: KindId,
    grammar: Option<KindId>,
    start_byte: usize,
    start_point: Point,
    field: Option<FieldId>,
    extra: bool,
    missing: bool,
}

impl NodeSpec {
    pub fn new(kind: KindId, start_byte: usize, start_point: Point) -> Self {
        Self {
            kind,
            grammar: None,
            start_byte,
            start_point,
            field: None,
            extra: false,
            missing: false,
        }
    }

    /// Grammar-internal symbol, when it differs from the public kind.
    pub fn grammar_id(mut self, id: KindId) -> Self {
        self.grammar = Some(id);
        self
    }

    /// Role of this node under its parent.
    pub fn field(mut self, field: Option<FieldId>) -> Self {
        self.field = field;
        self
    }

    pub fn extra(mut self, extra: bool) -> Self {
        self.extra = extra;
        self
    }

    pub fn missing(mut self, missing: bool) -> Self {
        self.missing = missing;
        self
    }
}

struct Frame {
    index: u32,
    children: Vec<u32>,
    named: u32,
}

/// Builds a [`Tree`] from a pre-order stream of nodes.
pub struct TreeBuilder {
    language: Language,
    nodes: Vec<NodeRecord>,
    children: Vec<u32>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            nodes: Vec::new(),
            children: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn with_capacity(language: Language, nodes: usize) -> Self {
        Self {
            language,
            nodes: Vec::with_capacity(nodes),
            children: Vec::with_capacity(nodes),
            stack: Vec::new(),
        }
    }

    /// Number of currently open nodes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn open(&mut self, spec: NodeSpec) -> Result<(), BuildError> {
        let grammar = spec.grammar.unwrap_or(spec.kind);
        for kind in [spec.kind, grammar] {
            if !self.language.has_kind(kind) {
                return Err(BuildError::UnknownKind { kind });
            }
        }
        if let Some(field) = spec.field
            && field.get() as usize > self.language.field_count()
        {
            return Err(BuildError::UnknownField { field });
        }

        let index = self.nodes.len();
        let parent = match self.stack.last() {
            Some(frame) => {
                let parent = &self.nodes[frame.index as usize];
                if spec.start_byte < parent.start_byte || spec.start_point < parent.start_point {
                    return Err(BuildError::OutsideParent { index });
                }
                if let Some(&prev) = frame.children.last() {
                    let prev = &self.nodes[prev as usize];
                    if spec.start_byte < prev.end_byte || spec.start_point < prev.end_point {
                        return Err(BuildError::SiblingOverlap { index });
                    }
                }
                Some(frame.index)
            }
            None if !self.nodes.is_empty() => return Err(BuildError::MultipleRoots),
            None => None,
        };

        let mut flags = NodeFlags::default();
        if self.language.kind_is_named(spec.kind) {
            flags.insert(NodeFlags::NAMED);
        }
        if spec.extra {
            flags.insert(NodeFlags::EXTRA);
        }
        if spec.missing {
            flags.insert(NodeFlags::MISSING | NodeFlags::HAS_ERROR);
        }
        if spec.kind == ERROR_KIND {
            flags.insert(NodeFlags::ERROR | NodeFlags::HAS_ERROR);
        }

        let index = index as u32;
        let named = flags.contains(NodeFlags::NAMED);
        let sibling_index = match self.stack.last_mut() {
            Some(frame) => {
                frame.children.push(index);
                frame.named += u32::from(named);
                frame.children.len() as u32 - 1
            }
            None => 0,
        };

        self.nodes.push(NodeRecord {
            kind: spec.kind,
            grammar,
            start_byte: spec.start_byte,
            end_byte: spec.start_byte,
            start_point: spec.start_point,
            end_point: spec.start_point,
            parent,
            children_start: 0,
            child_count: 0,
            named_child_count: 0,
            sibling_index,
            descendant_count: 1,
            field: spec.field,
            flags,
        });
        self.stack.push(Frame {
            index,
            children: Vec::new(),
            named: 0,
        });
        Ok(())
    }

    pub fn close(&mut self, end_byte: usize, end_point: Point) -> Result<(), BuildError> {
        let frame = self.stack.pop().ok_or(BuildError::UnbalancedClose)?;
        let index = frame.index as usize;

        let record = &self.nodes[index];
        if end_byte < record.start_byte || end_point < record.start_point {
            return Err(BuildError::InvertedRange { index });
        }
        if let Some(&last) = frame.children.last() {
            let last_child = &self.nodes[last as usize];
            if last_child.end_byte > end_byte || last_child.end_point > end_point {
                return Err(BuildError::OutsideParent {
                    index: last as usize,
                });
            }
        }

        let has_error = frame
            .children
            .iter()
            .any(|&c| self.nodes[c as usize].flags.contains(NodeFlags::HAS_ERROR));
        let children_start = self.children.len() as u32;
        let descendant_count = (self.nodes.len() - index) as u32;
        self.children.extend_from_slice(&frame.children);

        let record = &mut self.nodes[index];
        record.end_byte = end_byte;
        record.end_point = end_point;
        record.children_start = children_start;
        record.child_count = frame.children.len() as u32;
        record.named_child_count = frame.named;
        record.descendant_count = descendant_count;
        if has_error {
            record.flags.insert(NodeFlags::HAS_ERROR);
        }
        Ok(())
    }

    /// Open and immediately close a childless node.
    pub fn leaf(&mut self, spec: NodeSpec, end_byte: usize, end_point: Point) -> Result<(), BuildError> {
        self.open(spec)?;
        self.close(end_byte, end_point)
    }

    pub fn build(self) -> Result<Tree, BuildError> {
        if !self.stack.is_empty() {
            return Err(BuildError::Unclosed {
                open: self.stack.len(),
            });
        }
        if self.nodes.is_empty() {
            return Err(BuildError::Empty);
        }

        tracing::debug!(
            language = self.language.name(),
            nodes = self.nodes.len(),
            "built tree"
        );
        Ok(Tree::from_parts(self.language, self.nodes, self.children))
    }
}
