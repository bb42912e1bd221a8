//! Hand-built language and trees for engine tests.

use treehouse_core::{ERROR_KIND, Language, LanguageDescriptor, NodeSpec, Point, Tree, TreeBuilder};

pub fn toy_language() -> Language {
    let descriptor = LanguageDescriptor::new("toy")
        .abi_version(14)
        .named("program")
        .named("class")
        .named("constant")
        .named("body_statement")
        .named("method")
        .named("identifier")
        .named("comment")
        .anonymous("class")
        .anonymous("end")
        .anonymous("def")
        .anonymous("(")
        .anonymous(")")
        .kind("_statement", true, false)
        .field("name")
        .field("body")
        .field("parameters");
    Language::from_descriptor(descriptor).unwrap()
}

pub const SOURCE: &str = "class Foo\n  # note\n  def bar\n  end\n  def baz\n  end\nend\nclass Baz\nend\n";

/// Builds trees from kind names: `"\"end\""` is anonymous, `ERROR` the
/// error kind, anything else named.
pub struct Sketch {
    language: Language,
    source: &'static str,
    builder: TreeBuilder,
}

impl Sketch {
    pub fn new(source: &'static str) -> Self {
        let language = toy_language();
        Self {
            builder: TreeBuilder::new(language.clone()),
            language,
            source,
        }
    }

    fn point(&self, byte: usize) -> Point {
        Point::for_byte(self.source.as_bytes(), byte)
    }

    fn spec(&self, kind: &str, start: usize, field: Option<&str>) -> NodeSpec {
        let id = match kind.strip_prefix('"').and_then(|k| k.strip_suffix('"')) {
            _ if kind == "ERROR" => ERROR_KIND,
            Some(literal) => self.language.id_for_kind(literal, false).unwrap(),
            None => self.language.id_for_kind(kind, true).unwrap(),
        };
        let field = field.map(|f| self.language.field_id_for_name(f).unwrap());
        NodeSpec::new(id, start, self.point(start)).field(field)
    }

    pub fn open(&mut self, kind: &str, start: usize, field: Option<&str>) -> &mut Self {
        let spec = self.spec(kind, start, field);
        self.builder.open(spec).unwrap();
        self
    }

    pub fn close(&mut self, end: usize) -> &mut Self {
        let point = self.point(end);
        self.builder.close(end, point).unwrap();
        self
    }

    pub fn leaf(&mut self, kind: &str, start: usize, end: usize, field: Option<&str>) -> &mut Self {
        let spec = self.spec(kind, start, field);
        self.push(spec, end)
    }

    pub fn extra(&mut self, kind: &str, start: usize, end: usize) -> &mut Self {
        let spec = self.spec(kind, start, None).extra(true);
        self.push(spec, end)
    }

    pub fn missing(&mut self, kind: &str, at: usize) -> &mut Self {
        let spec = self.spec(kind, at, None).missing(true);
        self.push(spec, at)
    }

    fn push(&mut self, spec: NodeSpec, end: usize) -> &mut Self {
        let point = self.point(end);
        self.builder.leaf(spec, end, point).unwrap();
        self
    }

    pub fn build(self) -> Tree {
        self.builder.build().unwrap()
    }
}

/// Tree for [`SOURCE`]; ids are pre-order:
///
/// ```text
/// 0  program [0, 69)
/// 1    class [0, 54)
/// 2      "class" [0, 5)
/// 3      name: constant [6, 9)             Foo
/// 4      body: body_statement [12, 50)
/// 5        comment [12, 18)                extra
/// 6        method [21, 34)
/// 7          "def" [21, 24)
/// 8          name: identifier [25, 28)     bar
/// 9          "end" [31, 34)
/// 10       method [37, 50)
/// 11         "def" [37, 40)
/// 12         name: identifier [41, 44)     baz
/// 13         "end" [47, 50)
/// 14     "end" [51, 54)
/// 15   class [55, 68)
/// 16     "class" [55, 60)
/// 17     name: constant [61, 64)           Baz
/// 18     "end" [65, 68)
/// ```
pub fn sample_tree() -> Tree {
    let mut s = Sketch::new(SOURCE);
    s.open("program", 0, None);
    s.open("class", 0, None)
        .leaf("\"class\"", 0, 5, None)
        .leaf("constant", 6, 9, Some("name"))
        .open("body_statement", 12, Some("body"))
        .extra("comment", 12, 18);
    s.open("method", 21, None)
        .leaf("\"def\"", 21, 24, None)
        .leaf("identifier", 25, 28, Some("name"))
        .leaf("\"end\"", 31, 34, None)
        .close(34);
    s.open("method", 37, None)
        .leaf("\"def\"", 37, 40, None)
        .leaf("identifier", 41, 44, Some("name"))
        .leaf("\"end\"", 47, 50, None)
        .close(50);
    s.close(50).leaf("\"end\"", 51, 54, None).close(54);
    s.open("class", 55, None)
        .leaf("\"class\"", 55, 60, None)
        .leaf("constant", 61, 64, Some("name"))
        .leaf("\"end\"", 65, 68, None)
        .close(68);
    s.close(69);
    s.build()
}

pub const BROKEN_SOURCE: &str = "def foo(\nend\n@\n";

/// ```text
/// 0  program [0, 15)
/// 1    method [0, 12)
/// 2      "def" [0, 3)
/// 3      name: identifier [4, 7)
/// 4      "(" [7, 8)
/// 5      ")" [8, 8)       missing
/// 6      "end" [9, 12)
/// 7    ERROR [13, 14)
/// ```
pub fn broken_tree() -> Tree {
    let mut s = Sketch::new(BROKEN_SOURCE);
    s.open("program", 0, None);
    s.open("method", 0, None)
        .leaf("\"def\"", 0, 3, None)
        .leaf("identifier", 4, 7, Some("name"))
        .leaf("\"(\"", 7, 8, None)
        .missing("\")\"", 8)
        .leaf("\"end\"", 9, 12, None)
        .close(12);
    s.leaf("ERROR", 13, 14, None);
    s.close(15);
    s.build()
}
