//! Regions (§4.3): `::: … :::`, `<<< … <<<`, `""" … """`. Content is
//! recursively block-parsed until a closing fence of at least the
//! opener's rune count appears at column 0; the line after the closer
//! carries an optional trailing inline tail.
//!
//! The recursive body parse is gated by [`ParserContext::enter`], the same
//! nesting budget the inline parser's doubled-delimiter recursion uses —
//! without it, a deeply nested run of region openers would recurse the
//! native call stack unboundedly.

use super::BlockState;
use crate::driver::ParserContext;
use crate::inline;
use crate::tree::{Node, Tag, Value};

pub(super) fn try_region(ctx: &mut ParserContext, out: &mut Vec<Value>) -> bool {
    let ch = ctx.cursor.ch();
    if !matches!(ch, ':' | '"' | '<') {
        return false;
    }
    let start = ctx.cursor.pos();
    let mut count = 0u32;
    while ctx.cursor.ch() == ch {
        ctx.cursor.next();
        count += 1;
    }
    if count < 3 {
        ctx.cursor.set_pos(start);
        return false;
    }
    let Some(attrs) = super::parse_fence_trailer(ctx) else {
        ctx.cursor.set_pos(start);
        return false;
    };
    ctx.cursor.eat_eol();

    let Some(mut guard) = ctx.enter() else {
        ctx.cursor.set_pos(start);
        return false;
    };

    let tag = match ch {
        ':' => Tag::RegionBlock,
        '<' => Tag::RegionQuote,
        '"' => Tag::RegionVerse,
        _ => unreachable!(),
    };

    let mut state = BlockState::default();
    let mut body = Vec::new();
    super::parse_block_list(&mut guard, &mut state, &mut body, |c| is_closing_fence(c, ch, count));
    super::flush_all(&mut state, &mut body);

    let closed = consume_closing_fence(&mut guard, ch);
    if !closed {
        log::debug!("zmk: unterminated region (opener was {} x{count})", ch);
    }

    let trailing = if closed {
        inline::collect_until(&mut guard, false, |c| matches!(c.ch(), '\n' | '\r') || c.is_eos())
    } else {
        Vec::new()
    };
    guard.cursor.eat_eol();
    drop(guard);

    let mut node = Node::new(tag);
    node.push(attrs);
    node.push(Node::new(Tag::Block).with_arg_list(body));
    for v in trailing {
        node.push(v);
    }
    out.push(Value::Node(node));
    true
}

fn is_closing_fence(ctx: &mut ParserContext, ch: char, min_count: u32) -> bool {
    if !ctx.cursor.at_line_start() {
        return false;
    }
    let mut n = 0usize;
    while ctx.cursor.peek_n(n) == ch {
        n += 1;
    }
    n as u32 >= min_count
}

fn consume_closing_fence(ctx: &mut ParserContext, ch: char) -> bool {
    if ctx.cursor.is_eos() {
        return false;
    }
    while ctx.cursor.ch() == ch {
        ctx.cursor.next();
    }
    true
}
