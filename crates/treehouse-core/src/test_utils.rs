//! Small hand-written language and trees for unit tests.

use crate::{ERROR_KIND, FieldId, Language, LanguageDescriptor, NodeSpec, Point, Tree, TreeBuilder};

pub const SOURCE: &str = "class Foo\n  def bar\n  end\nend\nclass Baz\nend\n";

/// A Ruby-flavoured language with a handful of kinds.
///
/// Kind 0 mirrors the end-of-input sentinel and shares its name with the
/// visible `"end"` keyword at id 8.
pub fn toy_language() -> Language {
    let descriptor = LanguageDescriptor::new("toy")
        .abi_version(14)
        .kind("end", false, false)
        .named("program")
        .named("class")
        .named("constant")
        .named("body_statement")
        .named("method")
        .named("identifier")
        .anonymous("class")
        .anonymous("end")
        .anonymous("def")
        .named("comment")
        .named("call")
        .anonymous("(")
        .anonymous(")")
        .kind("_statement", true, false)
        .field("name")
        .field("body")
        .field("receiver");
    Language::from_descriptor(descriptor).unwrap()
}

/// Drives a [`TreeBuilder`] with kind and field names instead of IDs.
///
/// Quoted kinds (`"\"end\""`) resolve to anonymous kinds, `ERROR` to the
/// error kind, and anything else to a named kind. Points are derived from
/// byte offsets into the source.
pub struct Sketch {
    language: Language,
    source: &'static str,
    builder: TreeBuilder,
}

impl Sketch {
    pub fn new(language: Language, source: &'static str) -> Self {
        Self {
            builder: TreeBuilder::new(language.clone()),
            language,
            source,
        }
    }

    fn point(&self, byte: usize) -> Point {
        Point::for_byte(self.source.as_bytes(), byte)
    }

    pub fn spec(&self, kind: &str, start: usize) -> NodeSpec {
        let id = if kind == "ERROR" {
            ERROR_KIND
        } else if let Some(literal) = kind.strip_prefix('"').and_then(|k| k.strip_suffix('"')) {
            self.language.id_for_kind(literal, false).unwrap()
        } else {
            self.language.id_for_kind(kind, true).unwrap()
        };
        NodeSpec::new(id, start, self.point(start))
    }

    pub fn field(&self, name: &str) -> Option<FieldId> {
        Some(self.language.field_id_for_name(name).unwrap())
    }

    pub fn open(&mut self, kind: &str, start: usize) -> &mut Self {
        let spec = self.spec(kind, start);
        self.builder.open(spec).unwrap();
        self
    }

    pub fn open_field(&mut self, field: &str, kind: &str, start: usize) -> &mut Self {
        let spec = self.spec(kind, start).field(self.field(field));
        self.builder.open(spec).unwrap();
        self
    }

    pub fn close(&mut self, end: usize) -> &mut Self {
        let point = self.point(end);
        self.builder.close(end, point).unwrap();
        self
    }

    pub fn leaf(&mut self, kind: &str, start: usize, end: usize) -> &mut Self {
        let spec = self.spec(kind, start);
        self.push_leaf(spec, end)
    }

    pub fn leaf_field(&mut self, field: &str, kind: &str, start: usize, end: usize) -> &mut Self {
        let spec = self.spec(kind, start).field(self.field(field));
        self.push_leaf(spec, end)
    }

    pub fn push_leaf(&mut self, spec: NodeSpec, end: usize) -> &mut Self {
        let point = self.point(end);
        self.builder.leaf(spec, end, point).unwrap();
        self
    }

    pub fn build(self) -> Tree {
        self.builder.build().unwrap()
    }
}

/// Tree for [`SOURCE`]:
///
/// ```text
/// 0  program          [0, 44)
/// 1    class          [0, 29)
/// 2      "class"      [0, 5)
/// 3      constant     [6, 9)    name
/// 4      body_statement [12, 25) body
/// 5        method     [12, 25)
/// 6          "def"    [12, 15)
/// 7          identifier [16, 19) name
/// 8          "end"    [22, 25)
/// 9      "end"        [26, 29)
/// 10   class          [30, 43)
/// 11     "class"      [30, 35)
/// 12     constant     [36, 39)  name
/// 13     "end"        [40, 43)
/// ```
pub fn sample_tree() -> Tree {
    let mut s = Sketch::new(toy_language(), SOURCE);
    s.open("program", 0);
    s.open("class", 0)
        .leaf("\"class\"", 0, 5)
        .leaf_field("name", "constant", 6, 9)
        .open_field("body", "body_statement", 12)
        .open("method", 12)
        .leaf("\"def\"", 12, 15)
        .leaf_field("name", "identifier", 16, 19)
        .leaf("\"end\"", 22, 25)
        .close(25)
        .close(25)
        .leaf("\"end\"", 26, 29)
        .close(29);
    s.open("class", 30)
        .leaf("\"class\"", 30, 35)
        .leaf_field("name", "constant", 36, 39)
        .leaf("\"end\"", 40, 43)
        .close(43);
    s.close(44);
    s.build()
}
