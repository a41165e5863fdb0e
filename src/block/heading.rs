//! Headings (§4.3): `===` … `=======` (3-7 `=`, clamped beyond that).

use crate::attributes::parse_attributes;
use crate::cursor::Cursor;
use crate::driver::ParserContext;
use crate::inline;
use crate::tree::{Attributes, Node, Tag, Value};

pub(super) fn try_heading(ctx: &mut ParserContext, out: &mut Vec<Value>) -> bool {
    let start = ctx.cursor.pos();
    let mut count: u32 = 0;
    while ctx.cursor.ch() == '=' {
        ctx.cursor.next();
        count += 1;
    }
    if count < 3 || ctx.cursor.ch() != ' ' {
        ctx.cursor.set_pos(start);
        return false;
    }
    ctx.cursor.next();

    let line_start = ctx.cursor.pos();
    let mut probe = ctx.cursor.clone();
    while !matches!(probe.ch(), '\n' | '\r' | crate::cursor::EOS) {
        probe.next();
    }
    let line_end = probe.pos();
    let line = &ctx.cursor.src()[line_start..line_end];
    let (text_part, attrs) = split_trailing_attrs(line);

    let mut sub = ParserContext::new(text_part, ctx.config);
    let inlines = inline::collect_inlines(&mut sub, false);

    ctx.cursor.set_pos(line_end);
    ctx.cursor.eat_eol();

    let level = count.saturating_sub(2).min(5) as i64;
    let mut node = Node::new(Tag::Heading);
    node.push(Value::Int(level));
    node.push(attrs);
    node.push(Value::Text(String::new())); // slug, filled by a later pass
    node.push(Value::Text(String::new())); // fragment, filled by a later pass
    for v in inlines {
        node.push(v);
    }
    out.push(Value::Node(node));
    true
}

/// A trailing `{…}` (that isn't `{{`) on the heading's line attaches
/// attributes; everything before it is the heading's inline text.
fn split_trailing_attrs(line: &str) -> (&str, Attributes) {
    let trimmed = line.trim_end();
    if let Some(open) = trimmed.rfind('{') {
        if trimmed[open..].starts_with("{{") {
            return (line, Attributes::default());
        }
        let candidate = &trimmed[open..];
        let mut cursor = Cursor::new(candidate);
        if let Some(attrs) = parse_attributes(&mut cursor) {
            if cursor.is_eos() {
                return (&trimmed[..open], attrs);
            }
        }
    }
    (line, Attributes::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    #[test]
    fn level_from_delimiter_count() {
        let mut ctx = ParserContext::new("=== h\n", ParserConfig::default());
        let mut out = Vec::new();
        assert!(try_heading(&mut ctx, &mut out));
        let Value::Node(n) = &out[0] else { panic!() };
        assert_eq!(n.args[0], Value::Int(1));
    }

    #[test]
    fn level_clamps_at_five() {
        let mut ctx = ParserContext::new("======== h\n", ParserConfig::default());
        let mut out = Vec::new();
        assert!(try_heading(&mut ctx, &mut out));
        let Value::Node(n) = &out[0] else { panic!() };
        assert_eq!(n.args[0], Value::Int(5));
    }

    #[test]
    fn trailing_attrs_attach() {
        let mut ctx = ParserContext::new("=== h {.intro}\n", ParserConfig::default());
        let mut out = Vec::new();
        assert!(try_heading(&mut ctx, &mut out));
        let Value::Node(n) = &out[0] else { panic!() };
        let Value::Attrs(attrs) = &n.args[1] else { panic!() };
        assert_eq!(attrs.get("class"), Some("intro"));
    }

    #[test]
    fn missing_space_after_delimiters_fails() {
        let mut ctx = ParserContext::new("===h\n", ParserConfig::default());
        let pos = ctx.cursor.pos();
        let mut out = Vec::new();
        assert!(!try_heading(&mut ctx, &mut out));
        assert_eq!(ctx.cursor.pos(), pos);
    }
}
