//! The inline parser (component C4, §4.2).
//!
//! `next_inline` is the dispatch table: given the cursor's current rune (and
//! sometimes its next one), decide which inline production owns this
//! position. Every production either consumes at least one rune and returns
//! a value, or leaves the cursor untouched and returns `None`, in which case
//! the dispatcher falls back to [`scan_text_run`] so forward progress is
//! always guaranteed — no production gets to leave the driving loop stuck.

mod format;
mod refs;

use crate::cursor::{Cursor, EOS};
use crate::driver::ParserContext;
use crate::tree::{Node, Tag, Value};

/// Parse inline content until end of input. Used directly by `ParseInlines`
/// (§6, C7) and by any construct whose content runs to the end of its own
/// extracted sub-string rather than to a specific closer.
pub fn collect_inlines(ctx: &mut ParserContext, in_verse: bool) -> Vec<Value> {
    collect_until(ctx, in_verse, |c| c.is_eos())
}

/// Parse inline content until `stop` reports true (checked before every
/// token) or the cursor hits EOS. Shared by the block parser's paragraph
/// loop and by the bracketed-reference/formatting productions, each of
/// which has its own notion of "done".
pub(crate) fn collect_until(
    ctx: &mut ParserContext,
    in_verse: bool,
    mut stop: impl FnMut(&Cursor) -> bool,
) -> Vec<Value> {
    let mut out = Vec::new();
    loop {
        if ctx.cursor.is_eos() || stop(&ctx.cursor) {
            break;
        }
        match next_inline(ctx, in_verse) {
            Some(v) => out.push(v),
            None => break,
        }
    }
    out
}

/// Consume and return exactly one inline token, or `None` at EOS. Never
/// leaves the cursor stuck: every arm either advances or delegates to one
/// that does.
pub(crate) fn next_inline(ctx: &mut ParserContext, in_verse: bool) -> Option<Value> {
    let ch = ctx.cursor.ch();
    if ch == EOS {
        return None;
    }
    let value = match ch {
        '\n' | '\r' => {
            ctx.cursor.eat_eol();
            Node::leaf(Tag::Soft)
        }
        ' ' | '\t' => scan_space(ctx, in_verse),
        '[' => refs::dispatch_bracket(ctx, in_verse).unwrap_or_else(|| scan_text_run(ctx)),
        '{' if ctx.cursor.peek() == '{' => {
            refs::parse_embed(ctx, in_verse).unwrap_or_else(|| scan_text_run(ctx))
        }
        '_' | '*' | '>' | '~' | '^' | ',' | '"' | '#' | ':' => {
            format::try_formatting(ctx, in_verse, ch).unwrap_or_else(|| scan_text_run(ctx))
        }
        '@' | '`' | '\'' | '=' | '$' | '%' => {
            format::try_literal(ctx, ch).unwrap_or_else(|| scan_text_run(ctx))
        }
        '\\' => scan_escape(ctx),
        '-' if ctx.cursor.peek() == '-' => {
            ctx.cursor.next();
            ctx.cursor.next();
            Value::Node(Node::text("\u{2013}"))
        }
        '&' => scan_entity_or_text(ctx),
        _ => scan_text_run(ctx),
    };
    Some(value)
}

/// True when `cursor` sits on a rune that some dispatch arm above treats
/// specially — used by [`scan_text_run`] to know where a plain-text run has
/// to stop.
fn is_special(cursor: &Cursor) -> bool {
    match cursor.ch() {
        EOS | '\n' | '\r' | ' ' | '\t' | '\\' | '&' => true,
        '[' => true,
        '{' => cursor.peek() == '{',
        '_' | '*' | '>' | '~' | '^' | ',' | '"' | '#' | ':' => true,
        '@' | '`' | '\'' | '=' | '$' | '%' => true,
        '-' => cursor.peek() == '-',
        _ => false,
    }
}

/// "Anything else accumulates as (TEXT)" — also the universal fallback when
/// a special-looking construct turns out not to match: the triggering rune
/// is swallowed as literal text and the run continues from there.
fn scan_text_run(ctx: &mut ParserContext) -> Value {
    let start = ctx.cursor.pos();
    ctx.cursor.next();
    while !is_special(&ctx.cursor) {
        ctx.cursor.next();
    }
    let text = ctx.cursor.src()[start..ctx.cursor.pos()].to_string();
    Value::Node(Node::text(text))
}

/// Runs of space/tab coalesce into one `(SPACE)`. Inside a verse region the
/// literal run is kept as the node's argument, since the post-processor
/// needs the exact indentation to emit the right number of U+00A0 runs.
fn scan_space(ctx: &mut ParserContext, in_verse: bool) -> Value {
    let start = ctx.cursor.pos();
    while matches!(ctx.cursor.ch(), ' ' | '\t') {
        ctx.cursor.next();
    }
    if in_verse {
        let raw = ctx.cursor.src()[start..ctx.cursor.pos()].to_string();
        Value::Node(Node::new(Tag::Space).with_arg(Value::Text(raw)))
    } else {
        Node::leaf(Tag::Space)
    }
}

/// `\` at end-of-line (or true EOS, treated the same way) becomes `(HARD)`;
/// `\ ` becomes a non-breaking space; `\X` emits `X` verbatim.
fn scan_escape(ctx: &mut ParserContext) -> Value {
    debug_assert_eq!(ctx.cursor.ch(), '\\');
    ctx.cursor.next();
    match ctx.cursor.ch() {
        '\n' | '\r' => {
            ctx.cursor.eat_eol();
            Node::leaf(Tag::Hard)
        }
        EOS => Node::leaf(Tag::Hard),
        ' ' => {
            ctx.cursor.next();
            Value::Node(Node::text("\u{00A0}"))
        }
        ch => {
            ctx.cursor.next();
            Value::Node(Node::text(ch.to_string()))
        }
    }
}

fn scan_entity_or_text(ctx: &mut ParserContext) -> Value {
    match ctx.cursor.scan_entity() {
        Some(text) => Value::Node(Node::text(text)),
        None => scan_text_run(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn run(src: &str) -> Vec<Value> {
        let mut ctx = ParserContext::new(src, ParserConfig::default());
        collect_inlines(&mut ctx, false)
    }

    #[test]
    fn plain_text_accumulates_into_one_node() {
        let out = run("hello world");
        assert_eq!(out.len(), 3); // TEXT, SPACE, TEXT
        assert!(matches!(&out[0], Value::Node(n) if n.tag == Tag::Text));
    }

    #[test]
    fn en_dash() {
        let out = run("a--b");
        match &out[1] {
            Value::Node(n) if n.tag == Tag::Text => {
                assert_eq!(n.args[0], Value::Text("\u{2013}".into()));
            }
            other => panic!("expected dash text node, got {other:?}"),
        }
    }

    #[test]
    fn lone_underscore_is_literal() {
        let out = run("a_b");
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], Value::Node(n) if n.tag == Tag::Text));
    }

    #[test]
    fn trailing_backslash_at_eos_is_hard() {
        let out = run("x\\");
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[1], Value::Node(n) if n.tag == Tag::Hard));
    }
}
