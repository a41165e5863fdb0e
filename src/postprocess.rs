//! The tree post-processor (component C6, §4.4).
//!
//! One walk over the raw parse tree: merge adjacent `TEXT`, collapse a
//! trailing `(SPACE)(SOFT)` pair into `(HARD)`, drop leading space outside
//! verse and trailing breaks everywhere, elide nodes the walk leaves empty.
//! Dispatch is an exhaustive `match` over [`Tag`] rather than a lookup
//! table — the enum is closed, so the compiler itself checks every tag is
//! handled (spec.md §9's dispatch-table note, realized as the match being
//! the table).

use crate::error::{fatal, FatalParseError};
use crate::tree::{Node, Tag, Value};

/// How a container behaves when its normalized inline tail comes back
/// empty.
enum ElideRule {
    /// Elide the whole node (`PARA`, `INLINE`, headings, cell content).
    Always,
    /// Never elide — the node's identity (a reference, a citation key)
    /// doesn't depend on whether it carries display text.
    Never,
    /// Elide only if there *was* a tail to begin with; a construct that
    /// opened and closed with nothing between is kept bare (formatting).
    KeepIfOriginallyEmpty,
}

pub struct PostProcessor;

impl PostProcessor {
    pub fn new() -> Self {
        PostProcessor
    }

    /// Post-process a full `(BLOCK ...)` tree (or any block-level node).
    /// Returns `None` for an empty document.
    pub fn process_block(&self, node: Node, in_verse: bool) -> Option<Node> {
        self.process_node(node, in_verse)
    }

    /// Post-process a bare inline run (`ParseInlines`'s own children,
    /// before they're wrapped in `(INLINE ...)`).
    pub fn process_inline(&self, children: Vec<Value>, in_verse: bool) -> Vec<Value> {
        self.normalize_inline_list(children, in_verse)
    }

    fn process_node(&self, node: Node, in_verse: bool) -> Option<Node> {
        match node.tag {
            Tag::Block => self.process_block_list(node, in_verse),

            Tag::Para | Tag::Inline => self.inline_container(node, 0, in_verse, ElideRule::Always),
            Tag::Heading => self.inline_container(node, 4, in_verse, ElideRule::Always),
            Tag::Cell | Tag::CellLeft | Tag::CellRight => {
                self.inline_container(node, 0, in_verse, ElideRule::Always)
            }
            Tag::DefinitionTerm => self.inline_container(node, 0, in_verse, ElideRule::Always),

            Tag::FormatEmph
            | Tag::FormatStrong
            | Tag::FormatInsert
            | Tag::FormatDelete
            | Tag::FormatSuper
            | Tag::FormatSub
            | Tag::FormatQuote
            | Tag::FormatMark
            | Tag::FormatSpan => {
                self.inline_container(node, 1, in_verse, ElideRule::KeepIfOriginallyEmpty)
            }

            Tag::Endnote => self.inline_container(node, 1, in_verse, ElideRule::Never),
            Tag::Mark => self.inline_container(node, 2, in_verse, ElideRule::Never),
            Tag::Embed
            | Tag::Cite
            | Tag::Transclude
            | Tag::LinkExternal
            | Tag::LinkZettel
            | Tag::LinkQuery
            | Tag::LinkBroken
            | Tag::LinkFound
            | Tag::LinkHosted
            | Tag::LinkInvalid
            | Tag::LinkSelf
            | Tag::LinkBased => self.inline_container(node, 2, in_verse, ElideRule::Never),

            Tag::RegionBlock | Tag::RegionQuote | Tag::RegionVerse => {
                self.process_region(node, in_verse)
            }

            Tag::ListUnordered
            | Tag::ListOrdered
            | Tag::ListQuote
            | Tag::DefinitionList
            | Tag::DefinitionDescription => self.process_block_list(node, in_verse),

            Tag::Table => self.process_table(node, in_verse),

            Tag::Text => {
                let empty = matches!(node.args.first(), Some(Value::Text(s)) if s.is_empty());
                if empty {
                    None
                } else {
                    Some(node)
                }
            }

            Tag::VerbatimZettel
            | Tag::VerbatimProg
            | Tag::VerbatimComment
            | Tag::VerbatimEval
            | Tag::VerbatimMath => {
                let empty = matches!(node.args.last(), Some(Value::Text(s)) if s.is_empty());
                if empty {
                    None
                } else {
                    Some(node)
                }
            }

            // Ignore set: pass through unchanged. Literal/verbatim payloads
            // are raw content the post-processor must never walk.
            Tag::Thematic
            | Tag::LiteralZettel
            | Tag::LiteralProg
            | Tag::LiteralHtml
            | Tag::LiteralInput
            | Tag::LiteralOutput
            | Tag::LiteralComment
            | Tag::LiteralMath
            | Tag::External => Some(node),

            // Bare whitespace tokens only ever arrive here via an inline
            // list's own recursion (handled in `normalize_inline_list`);
            // reaching this arm directly is harmless passthrough.
            Tag::Space | Tag::Soft | Tag::Hard => Some(node),
        }
    }

    /// Recursively post-process a `BLOCK`-shaped tail: drop children that
    /// post-process to nothing, elide the parent if none remain.
    fn process_block_list(&self, node: Node, in_verse: bool) -> Option<Node> {
        let Node { tag, args } = node;
        let children = self.process_block_children(args, in_verse);
        if children.is_empty() {
            None
        } else {
            Some(Node { tag, args: children })
        }
    }

    fn process_block_children(&self, children: Vec<Value>, in_verse: bool) -> Vec<Value> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Value::Node(n) => {
                    let inner_verse = child_in_verse(n.tag, in_verse);
                    if let Some(processed) = self.process_node(n, inner_verse) {
                        out.push(Value::Node(processed));
                    }
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Split a node's args at `prefix_len` into a non-inline prefix (attrs,
    /// level, ref text, ...) and an inline tail, normalize the tail, and
    /// decide whether the whole node survives an empty result per `rule`.
    fn inline_container(
        &self,
        mut node: Node,
        prefix_len: usize,
        in_verse: bool,
        rule: ElideRule,
    ) -> Option<Node> {
        let split_at = prefix_len.min(node.args.len());
        let had_tail = node.args.len() > split_at;
        let tail = node.args.split_off(split_at);
        let normalized = self.normalize_inline_list(tail, in_verse);
        if normalized.is_empty() {
            return match rule {
                ElideRule::Never => Some(node),
                ElideRule::Always => None,
                ElideRule::KeepIfOriginallyEmpty => {
                    if had_tail {
                        None
                    } else {
                        Some(node)
                    }
                }
            };
        }
        node.args.extend(normalized);
        Some(node)
    }

    /// A region's body is a nested `BLOCK`, its tail is an inline run; both
    /// are processed under the region's own verse-ness, and the region is
    /// elided only if both come back empty.
    fn process_region(&self, node: Node, _outer_verse: bool) -> Option<Node> {
        let region_verse = node.tag == Tag::RegionVerse;
        let mut args = node.args.into_iter();
        let attrs = match args.next() {
            Some(v) => v,
            None => fatal(FatalParseError::UnknownTag(node.tag)),
        };
        let body = args.next();
        let rest: Vec<Value> = args.collect();

        let body_processed = match body {
            Some(Value::Node(b)) if b.tag == Tag::Block => {
                self.process_node(b, region_verse).map(Value::Node)
            }
            other => other,
        };
        let trailing = self.normalize_inline_list(rest, region_verse);

        if body_processed.is_none() && trailing.is_empty() {
            return None;
        }

        let mut new_args = vec![attrs, body_processed.unwrap_or_else(|| Value::Node(Node::new(Tag::Block)))];
        new_args.extend(trailing);
        Some(Node {
            tag: node.tag,
            args: new_args,
        })
    }

    /// `(TABLE header-row body-rows)` (§4.3): a fixed two-slot shape, not a
    /// generic `BLOCK` tail, so neither slot is ever elided even when the
    /// table has no header row. The shapes of the two slots differ: the
    /// header slot is itself one row (a `TABLE` node whose children are
    /// `CELL`/`CELL-LEFT`/`CELL-RIGHT` nodes directly, empty if there's no
    /// header), while the body slot is a `TABLE` node whose children are
    /// further `TABLE` row nodes, each in turn holding cells — matching
    /// `block::table::flush`'s actual accumulator output.
    fn process_table(&self, node: Node, in_verse: bool) -> Option<Node> {
        let mut args = node.args.into_iter();
        let header = self.process_table_row(args.next(), in_verse);
        let body = self.process_table_body(args.next(), in_verse);
        Some(Node {
            tag: Tag::Table,
            args: vec![header, body],
        })
    }

    /// Normalize one row's cells directly (used for the header slot, which
    /// holds at most a single row with no extra wrapping layer).
    fn process_table_row(&self, row: Option<Value>, in_verse: bool) -> Value {
        match row {
            Some(Value::Node(r)) if r.tag == Tag::Table => {
                let cells = self.process_block_children(r.args, in_verse);
                Value::Node(Node { tag: Tag::Table, args: cells })
            }
            _ => Value::Node(Node::new(Tag::Table)),
        }
    }

    /// Normalize a container of row nodes (used for the body slot).
    fn process_table_body(&self, container: Option<Value>, in_verse: bool) -> Value {
        match container {
            Some(Value::Node(c)) if c.tag == Tag::Table => {
                let rows = c
                    .args
                    .into_iter()
                    .map(|row| self.process_table_row(Some(row), in_verse))
                    .collect();
                Value::Node(Node { tag: Tag::Table, args: rows })
            }
            _ => Value::Node(Node::new(Tag::Table)),
        }
    }

    /// The inline-list normalization pass (§4.4): recurse, promote `SOFT`
    /// to `HARD` inside verse, drop leading space outside verse, merge
    /// adjacent `TEXT`, collapse `(SPACE)(SOFT)` into `(HARD)`, drop
    /// trailing breaks.
    fn normalize_inline_list(&self, children: Vec<Value>, in_verse: bool) -> Vec<Value> {
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Value::Node(n) => {
                    let inner_verse = child_in_verse(n.tag, in_verse);
                    if let Some(processed) = self.process_node(n, inner_verse) {
                        items.push(Value::Node(processed));
                    }
                }
                other => items.push(other),
            }
        }

        if in_verse {
            for v in items.iter_mut() {
                if let Value::Node(n) = v {
                    if n.tag == Tag::Soft {
                        n.tag = Tag::Hard;
                    }
                }
            }
        } else {
            while matches!(items.first(), Some(v) if v.is_space()) {
                items.remove(0);
            }
        }

        let merged = merge_adjacent_text(items);
        let mut collapsed = collapse_space_soft(merged);

        while matches!(collapsed.last(), Some(v) if v.is_trailing_break()) {
            collapsed.pop();
        }
        collapsed
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Which verse-ness a node's own children should see: entering a verse
/// region turns it on, entering a block/quote region turns it off,
/// anything else propagates the current value unchanged.
fn child_in_verse(tag: Tag, outer: bool) -> bool {
    match tag {
        Tag::RegionVerse => true,
        Tag::RegionBlock | Tag::RegionQuote => false,
        _ => outer,
    }
}

fn merge_adjacent_text(items: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for v in items {
        if let Value::Node(cur) = &v {
            if cur.tag == Tag::Text {
                if let Some(Value::Node(last)) = out.last_mut() {
                    if last.tag == Tag::Text {
                        if let (Some(Value::Text(ls)), Some(Value::Text(cs))) =
                            (last.args.get_mut(0), cur.args.first())
                        {
                            ls.push_str(cs);
                            continue;
                        }
                    }
                }
            }
        }
        out.push(v);
    }
    out
}

fn collapse_space_soft(items: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    let mut iter = items.into_iter().peekable();
    while let Some(v) = iter.next() {
        if v.is_space() {
            if let Some(next) = iter.peek() {
                if next.is_soft() {
                    iter.next();
                    out.push(Node::leaf(Tag::Hard));
                    continue;
                }
            }
        }
        out.push(v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Node(Node::text(s))
    }

    #[test]
    fn merges_adjacent_text() {
        let pp = PostProcessor::new();
        let out = pp.process_inline(vec![text("a"), text("b")], false);
        assert_eq!(out, vec![text("ab")]);
    }

    #[test]
    fn drops_leading_space_outside_verse() {
        let pp = PostProcessor::new();
        let out = pp.process_inline(vec![Node::leaf(Tag::Space), text("a")], false);
        assert_eq!(out, vec![text("a")]);
    }

    #[test]
    fn keeps_leading_space_inside_verse() {
        let pp = PostProcessor::new();
        let out = pp.process_inline(vec![Node::leaf(Tag::Space), text("a")], true);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn collapses_trailing_space_soft_into_hard() {
        let pp = PostProcessor::new();
        let out = pp.process_inline(
            vec![text("a"), Node::leaf(Tag::Space), Node::leaf(Tag::Soft), text("b")],
            false,
        );
        assert_eq!(out.len(), 3);
        assert!(matches!(&out[1], Value::Node(n) if n.tag == Tag::Hard));
    }

    #[test]
    fn drops_trailing_breaks() {
        let pp = PostProcessor::new();
        let out = pp.process_inline(vec![text("a"), Node::leaf(Tag::Soft)], false);
        assert_eq!(out, vec![text("a")]);
    }

    #[test]
    fn verse_promotes_soft_to_hard() {
        let pp = PostProcessor::new();
        let out = pp.process_inline(vec![text("a"), Node::leaf(Tag::Soft), text("b")], true);
        assert!(matches!(&out[1], Value::Node(n) if n.tag == Tag::Hard));
    }

    #[test]
    fn empty_para_is_elided() {
        let pp = PostProcessor::new();
        let node = Node::new(Tag::Para).with_arg(Node::leaf(Tag::Soft));
        assert!(pp.process_block(node, false).is_none());
    }

    #[test]
    fn bare_formatting_with_no_tail_is_kept() {
        let pp = PostProcessor::new();
        let node = Node::new(Tag::FormatEmph).with_arg(crate::tree::Attributes::default());
        assert!(pp.process_block(node, false).is_some());
    }

    #[test]
    fn endnote_without_tail_is_kept_with_empty_content() {
        let pp = PostProcessor::new();
        let node = Node::new(Tag::Endnote).with_arg(crate::tree::Attributes::default());
        let out = pp.process_block(node, false).unwrap();
        assert_eq!(out.args.len(), 1);
    }

    #[test]
    fn link_survives_even_with_no_display_text() {
        let pp = PostProcessor::new();
        let node = Node::new(Tag::LinkExternal)
            .with_arg(crate::tree::Attributes::default())
            .with_arg(Value::Text("https://example.com".into()));
        let out = pp.process_block(node, false).unwrap();
        assert_eq!(out.args.len(), 2);
    }
}
