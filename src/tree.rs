//! Tree primitives: the tagged-list-cell data model (data model §3).
//!
//! A Zettelmarkup node is `(TAG arg1 arg2 ...)` where `TAG` is drawn from a
//! closed vocabulary and the args are themselves nodes, strings, integers,
//! or attribute mappings. Rather than a generic cons-cell chain (the shape
//! the spec was distilled from), each node owns a `Vec<Value>` — Rust's
//! vector already gives O(1) amortized append and single ownership, so a
//! hand-rolled list type would add indirection without buying anything.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed tag vocabulary from data model §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    // Document root
    Block,
    // Blocks
    Para,
    Heading,
    Thematic,
    RegionBlock,
    RegionQuote,
    RegionVerse,
    VerbatimZettel,
    VerbatimProg,
    VerbatimComment,
    VerbatimEval,
    VerbatimMath,
    ListUnordered,
    ListOrdered,
    ListQuote,
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    Table,
    Cell,
    CellLeft,
    CellRight,
    Transclude,
    // Inlines
    Inline,
    Text,
    Space,
    Soft,
    Hard,
    FormatEmph,
    FormatStrong,
    FormatInsert,
    FormatDelete,
    FormatSuper,
    FormatSub,
    FormatQuote,
    FormatMark,
    FormatSpan,
    LiteralZettel,
    LiteralProg,
    LiteralHtml,
    LiteralInput,
    LiteralOutput,
    LiteralComment,
    LiteralMath,
    LinkExternal,
    LinkZettel,
    LinkQuery,
    LinkBroken,
    LinkFound,
    LinkHosted,
    LinkInvalid,
    LinkSelf,
    LinkBased,
    Embed,
    Cite,
    Endnote,
    Mark,
    /// A reference produced by the external reference parser and embedded
    /// verbatim inside a `TRANSCLUDE` node.
    External,
}

impl Tag {
    /// True for nodes whose tail is a sequence of inline `Value`s that the
    /// post-processor should normalise (merge text, drop trailing breaks).
    pub fn is_inline_container(self) -> bool {
        matches!(
            self,
            Tag::Inline
                | Tag::Para
                | Tag::Heading
                | Tag::FormatEmph
                | Tag::FormatStrong
                | Tag::FormatInsert
                | Tag::FormatDelete
                | Tag::FormatSuper
                | Tag::FormatSub
                | Tag::FormatQuote
                | Tag::FormatMark
                | Tag::FormatSpan
                | Tag::Embed
                | Tag::Cite
                | Tag::Endnote
                | Tag::Mark
                | Tag::RegionBlock
                | Tag::RegionQuote
                | Tag::RegionVerse
        )
    }

    /// True for literal/verbatim tags whose string payload is raw content
    /// the post-processor must never walk or merge.
    pub fn is_raw_literal(self) -> bool {
        matches!(
            self,
            Tag::LiteralZettel
                | Tag::LiteralProg
                | Tag::LiteralHtml
                | Tag::LiteralInput
                | Tag::LiteralOutput
                | Tag::LiteralComment
                | Tag::LiteralMath
                | Tag::VerbatimZettel
                | Tag::VerbatimProg
                | Tag::VerbatimComment
                | Tag::VerbatimEval
                | Tag::VerbatimMath
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tag::Block => "BLOCK",
            Tag::Para => "PARA",
            Tag::Heading => "HEADING",
            Tag::Thematic => "THEMATIC",
            Tag::RegionBlock => "REGION-BLOCK",
            Tag::RegionQuote => "REGION-QUOTE",
            Tag::RegionVerse => "REGION-VERSE",
            Tag::VerbatimZettel => "VERBATIM-ZETTEL",
            Tag::VerbatimProg => "VERBATIM-PROG",
            Tag::VerbatimComment => "VERBATIM-COMMENT",
            Tag::VerbatimEval => "VERBATIM-EVAL",
            Tag::VerbatimMath => "VERBATIM-MATH",
            Tag::ListUnordered => "LIST-UNORDERED",
            Tag::ListOrdered => "LIST-ORDERED",
            Tag::ListQuote => "LIST-QUOTE",
            Tag::DefinitionList => "DEFINITION-LIST",
            Tag::DefinitionTerm => "DEFINITION-TERM",
            Tag::DefinitionDescription => "DEFINITION-DESCRIPTION",
            Tag::Table => "TABLE",
            Tag::Cell => "CELL",
            Tag::CellLeft => "CELL-LEFT",
            Tag::CellRight => "CELL-RIGHT",
            Tag::Transclude => "TRANSCLUDE",
            Tag::Inline => "INLINE",
            Tag::Text => "TEXT",
            Tag::Space => "SPACE",
            Tag::Soft => "SOFT",
            Tag::Hard => "HARD",
            Tag::FormatEmph => "FORMAT-EMPH",
            Tag::FormatStrong => "FORMAT-STRONG",
            Tag::FormatInsert => "FORMAT-INSERT",
            Tag::FormatDelete => "FORMAT-DELETE",
            Tag::FormatSuper => "FORMAT-SUPER",
            Tag::FormatSub => "FORMAT-SUB",
            Tag::FormatQuote => "FORMAT-QUOTE",
            Tag::FormatMark => "FORMAT-MARK",
            Tag::FormatSpan => "FORMAT-SPAN",
            Tag::LiteralZettel => "LITERAL-ZETTEL",
            Tag::LiteralProg => "LITERAL-PROG",
            Tag::LiteralHtml => "LITERAL-HTML",
            Tag::LiteralInput => "LITERAL-INPUT",
            Tag::LiteralOutput => "LITERAL-OUTPUT",
            Tag::LiteralComment => "LITERAL-COMMENT",
            Tag::LiteralMath => "LITERAL-MATH",
            Tag::LinkExternal => "LINK-EXTERNAL",
            Tag::LinkZettel => "LINK-ZETTEL",
            Tag::LinkQuery => "LINK-QUERY",
            Tag::LinkBroken => "LINK-BROKEN",
            Tag::LinkFound => "LINK-FOUND",
            Tag::LinkHosted => "LINK-HOSTED",
            Tag::LinkInvalid => "LINK-INVALID",
            Tag::LinkSelf => "LINK-SELF",
            Tag::LinkBased => "LINK-BASED",
            Tag::Embed => "EMBED",
            Tag::Cite => "CITE",
            Tag::Endnote => "ENDNOTE",
            Tag::Mark => "MARK",
            Tag::External => "EXTERNAL",
        };
        f.write_str(s)
    }
}

/// Ordered key→value attribute mapping (§4.1). An empty key denotes the
/// default/syntax slot. Re-inserting an existing key concatenates the new
/// value onto the old one with a single space, per the design notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert a key/value pair, merging with any existing value for the
    /// same key by concatenating with a single space.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some((_, existing)) = self.0.iter_mut().find(|(k, _)| *k == key) {
            if existing.is_empty() {
                *existing = value;
            } else if !value.is_empty() {
                existing.push(' ');
                existing.push_str(&value);
            }
        } else {
            self.0.push((key, value));
        }
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.insert("class", class);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a key, returning its value if present. Used by the
    /// `LITERAL-ZETTEL` → `LITERAL-HTML` retag rule to drop the consumed
    /// `""="html"` entry.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.0.iter()
    }
}

/// A node argument: another node, a raw string, an integer (heading level),
/// or an attribute mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Node(Node),
    Text(String),
    Int(i64),
    Attrs(Attributes),
}

impl Value {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True for the break tokens the post-processor drops at the end of an
    /// inline run (invariant 5).
    pub fn is_trailing_break(&self) -> bool {
        matches!(
            self,
            Value::Node(Node { tag: Tag::Space, .. })
                | Value::Node(Node { tag: Tag::Soft, .. })
                | Value::Node(Node { tag: Tag::Hard, .. })
        )
    }

    pub fn is_space(&self) -> bool {
        matches!(self, Value::Node(Node { tag: Tag::Space, .. }))
    }

    pub fn is_soft(&self) -> bool {
        matches!(self, Value::Node(Node { tag: Tag::Soft, .. }))
    }
}

impl From<Node> for Value {
    fn from(n: Node) -> Self {
        Value::Node(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Attributes> for Value {
    fn from(a: Attributes) -> Self {
        Value::Attrs(a)
    }
}

/// A tagged node: `(TAG arg1 arg2 ...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub tag: Tag,
    pub args: Vec<Value>,
}

impl Node {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn push(&mut self, arg: impl Into<Value>) {
        self.args.push(arg.into());
    }

    pub fn with_arg_list(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn len(&self) -> usize {
        self.args.len() + 1
    }

    /// Attributes argument, if this node's shape carries one as its first
    /// argument (the common case for blocks and inlines that accept `{…}`).
    pub fn attrs(&self) -> Option<&Attributes> {
        match self.args.first() {
            Some(Value::Attrs(a)) => Some(a),
            _ => None,
        }
    }

    pub fn attrs_mut(&mut self) -> Option<&mut Attributes> {
        match self.args.first_mut() {
            Some(Value::Attrs(a)) => Some(a),
            _ => None,
        }
    }

    /// A `(TEXT "…")` node.
    pub fn text(s: impl Into<String>) -> Node {
        Node::new(Tag::Text).with_arg(Value::Text(s.into()))
    }

    /// A payload-free node such as `(SPACE)`, `(SOFT)`, `(HARD)`.
    pub fn leaf(tag: Tag) -> Value {
        Value::Node(Node::new(tag))
    }
}

/// O(1)-amortized-append builder for a growing sequence of `Value`s —
/// the Rust answer to design notes §9's "builder type that caches the
/// last cell of the list being grown". A `Vec` already *is* that cache
/// (its length is known and push is amortized O(1)), so the builder here
/// is a thin, clearly-named wrapper rather than a reimplementation of
/// cons-cell bookkeeping.
#[derive(Debug, Default)]
pub struct SeqBuilder {
    items: Vec<Value>,
}

impl SeqBuilder {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn last(&self) -> Option<&Value> {
        self.items.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Value> {
        self.items.last_mut()
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }
}
