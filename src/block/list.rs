//! Nested lists (§4.3): `*`, `#`, `>` runs. Each line restates the full
//! kind-stack from the root down to its own depth (`*` then `**` then
//! `*#`, etc); the current line's stack is compared against the
//! previously-open one depth by depth, and the first divergence truncates
//! the open stack before new levels replace the tail. The most intricate
//! stateful part of the block parser, per the design notes.

use super::BlockState;
use crate::driver::ParserContext;
use crate::inline;
use crate::tree::{Node, Tag, Value};

struct ListLevel {
    tag: Tag,
    node: Node,
}

#[derive(Default)]
pub(crate) struct ListStack {
    levels: Vec<ListLevel>,
}

fn kind_for(ch: char) -> Option<Tag> {
    match ch {
        '*' => Some(Tag::ListUnordered),
        '#' => Some(Tag::ListOrdered),
        '>' => Some(Tag::ListQuote),
        _ => None,
    }
}

/// Lookahead-only: would the cursor's current position start a valid
/// marker line? Used to decide whether an indented line is a list
/// continuation rather than something else.
pub(crate) fn looks_like_continuation(ctx: &ParserContext, state: &BlockState) -> bool {
    !state.lists.levels.is_empty() && matches!(ctx.cursor.ch(), ' ' | '\t')
}

/// Consume the marker run plus its mandatory trailing space (or, for a
/// quote-only marker, the bare EOL/EOS it's allowed to stand alone on).
/// `None` leaves the cursor untouched.
fn scan_marker(ctx: &mut ParserContext) -> Option<Vec<Tag>> {
    let start = ctx.cursor.pos();
    let mut kinds = Vec::new();
    while let Some(tag) = kind_for(ctx.cursor.ch()) {
        kinds.push(tag);
        ctx.cursor.next();
    }
    if kinds.is_empty() {
        return None;
    }
    if ctx.cursor.ch() == ' ' {
        ctx.cursor.next();
        Some(kinds)
    } else if kinds.last() == Some(&Tag::ListQuote)
        && (matches!(ctx.cursor.ch(), '\n' | '\r') || ctx.cursor.is_eos())
    {
        Some(kinds)
    } else {
        ctx.cursor.set_pos(start);
        None
    }
}

/// Pop the deepest open level, handing its finished node to the parent
/// level's last item (or to the top-level output once the stack empties).
fn close_top(stack: &mut ListStack, out: &mut Vec<Value>) {
    let Some(level) = stack.levels.pop() else {
        return;
    };
    let value = Value::Node(level.node);
    if let Some(parent) = stack.levels.last_mut() {
        if let Some(Value::Node(last_item)) = parent.node.args.last_mut() {
            last_item.push(value);
            return;
        }
    }
    out.push(value);
}

/// Truncate the stack at the first divergence from `kinds`, then push
/// fresh levels for whatever's new — the "mismatch truncates the stack"
/// rule (§4.3).
fn reconcile(stack: &mut ListStack, out: &mut Vec<Value>, kinds: &[Tag]) {
    let mut i = 0;
    while i < stack.levels.len() && i < kinds.len() && stack.levels[i].tag == kinds[i] {
        i += 1;
    }
    while stack.levels.len() > i {
        close_top(stack, out);
    }
    for &k in &kinds[i..] {
        stack.levels.push(ListLevel {
            tag: k,
            node: Node::new(k),
        });
    }
}

pub(super) fn try_start(ctx: &mut ParserContext, state: &mut BlockState, out: &mut Vec<Value>) -> bool {
    let start = ctx.cursor.pos();
    let Some(kinds) = scan_marker(ctx) else {
        return false;
    };
    let children = inline::collect_until(ctx, false, |c| matches!(c.ch(), '\n' | '\r') || c.is_eos());
    if children.is_empty() && !matches!(kinds.last(), Some(Tag::ListQuote)) {
        // A non-quote list item needs at least some content on its line;
        // otherwise this wasn't really a list marker after all.
        ctx.cursor.set_pos(start);
        return false;
    }
    ctx.cursor.eat_eol();

    reconcile(&mut state.lists, out, &kinds);

    let mut item_block = Node::new(Tag::Block);
    if !children.is_empty() {
        item_block.push(Node::new(Tag::Para).with_arg_list(children));
    }
    if let Some(level) = state.lists.levels.last_mut() {
        level.node.push(Value::Node(item_block));
    }
    true
}

/// An indented line while a list is open: a continuation block for the
/// current item (appended to, or merged with, its trailing paragraph).
pub(super) fn try_continue(ctx: &mut ParserContext, state: &mut BlockState, _out: &mut Vec<Value>) -> bool {
    let start = ctx.cursor.pos();
    while matches!(ctx.cursor.ch(), ' ' | '\t') {
        ctx.cursor.next();
    }
    if matches!(ctx.cursor.ch(), '\n' | '\r') || ctx.cursor.is_eos() {
        ctx.cursor.set_pos(start);
        return false;
    }
    let children = inline::collect_until(ctx, false, |c| matches!(c.ch(), '\n' | '\r') || c.is_eos());
    ctx.cursor.eat_eol();
    if children.is_empty() {
        return true;
    }

    let Some(level) = state.lists.levels.last_mut() else {
        return false;
    };
    let Some(Value::Node(last_item)) = level.node.args.last_mut() else {
        return false;
    };
    if let Some(Value::Node(last_child)) = last_item.args.last_mut() {
        if last_child.tag == Tag::Para {
            last_child.args.extend(children);
            return true;
        }
    }
    last_item.push(Node::new(Tag::Para).with_arg_list(children));
    true
}

pub(crate) fn flush_all(state: &mut BlockState, out: &mut Vec<Value>) {
    while !state.lists.levels.is_empty() {
        close_top(&mut state.lists, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn parse(src: &str) -> Node {
        let mut ctx = ParserContext::new(src, ParserConfig::default());
        super::super::parse_document(&mut ctx)
    }

    #[test]
    fn flat_unordered_list() {
        let doc = parse("* a\n* b\n");
        assert_eq!(doc.args.len(), 1);
        let Value::Node(list) = &doc.args[0] else { panic!() };
        assert_eq!(list.tag, Tag::ListUnordered);
        assert_eq!(list.args.len(), 2);
    }

    #[test]
    fn nested_list_matches_depth_stack() {
        let doc = parse("* a\n** b\n* c\n");
        let Value::Node(outer) = &doc.args[0] else { panic!() };
        assert_eq!(outer.tag, Tag::ListUnordered);
        assert_eq!(outer.args.len(), 2);
        let Value::Node(first_item) = &outer.args[0] else { panic!() };
        assert_eq!(first_item.args.len(), 2); // PARA + nested LIST
        let Value::Node(nested) = &first_item.args[1] else { panic!() };
        assert_eq!(nested.tag, Tag::ListUnordered);
        assert_eq!(nested.args.len(), 1);
    }

    #[test]
    fn mismatched_kind_truncates_and_replaces() {
        // "*# c" diverges from the open "**" (unordered) nested list at
        // depth 2, closing it and opening a new ordered one as a sibling
        // block inside the same depth-1 item.
        let doc = parse("* a\n** b\n*# c\n");
        let Value::Node(outer) = &doc.args[0] else { panic!() };
        let Value::Node(first_item) = &outer.args[0] else { panic!() };
        assert_eq!(first_item.args.len(), 3);
        let Value::Node(first_nested) = &first_item.args[1] else { panic!() };
        assert_eq!(first_nested.tag, Tag::ListUnordered);
        let Value::Node(second_nested) = &first_item.args[2] else { panic!() };
        assert_eq!(second_nested.tag, Tag::ListOrdered);
    }

    #[test]
    fn quote_list_item_may_be_empty() {
        let doc = parse(">\n> text\n");
        let Value::Node(list) = &doc.args[0] else { panic!() };
        assert_eq!(list.tag, Tag::ListQuote);
        assert_eq!(list.args.len(), 2);
        let Value::Node(empty_item) = &list.args[0] else { panic!() };
        assert!(empty_item.args.is_empty());
    }

    #[test]
    fn blank_line_closes_the_list() {
        let doc = parse("* a\n\n* b\n");
        assert_eq!(doc.args.len(), 2);
    }
}
