//! Definition lists (§4.3): `;` terms and `:` descriptions, flattened into
//! an alternating `(DEFINITION-LIST (DEFINITION-TERM ...) (DEFINITION-
//! DESCRIPTION (BLOCK ...)) ...)` sequence. A run of consecutive term/
//! description lines (no blank line between them) belongs to one list;
//! the list closes the moment something else is dispatched.

use super::BlockState;
use crate::driver::ParserContext;
use crate::inline;
use crate::tree::{Node, Tag, Value};

/// Index, within `out`, of the `DEFINITION-LIST` the previous term or
/// description line belongs to — `None` once anything else has closed it.
#[derive(Default)]
pub(crate) struct DefinitionState {
    open_list: Option<usize>,
}

fn current_list<'a>(out: &'a mut [Value], idx: usize) -> &'a mut Node {
    match &mut out[idx] {
        Value::Node(n) => n,
        _ => unreachable!("definition list slot must hold a Node"),
    }
}

fn ensure_list(state: &mut BlockState, out: &mut Vec<Value>) -> usize {
    if let Some(idx) = state.definitions.open_list {
        if matches!(out.get(idx), Some(Value::Node(n)) if n.tag == Tag::DefinitionList) {
            return idx;
        }
    }
    out.push(Value::Node(Node::new(Tag::DefinitionList)));
    let idx = out.len() - 1;
    state.definitions.open_list = Some(idx);
    idx
}

pub(crate) fn close(state: &mut BlockState) {
    state.definitions.open_list = None;
}

/// `; term text`
pub(super) fn try_term(ctx: &mut ParserContext, state: &mut BlockState, out: &mut Vec<Value>) -> bool {
    let start = ctx.cursor.pos();
    if ctx.cursor.ch() != ';' {
        return false;
    }
    ctx.cursor.next();
    if ctx.cursor.ch() == ' ' {
        ctx.cursor.next();
    } else if !matches!(ctx.cursor.ch(), '\n' | '\r') && !ctx.cursor.is_eos() {
        ctx.cursor.set_pos(start);
        return false;
    }

    let children = inline::collect_until(ctx, false, |c| matches!(c.ch(), '\n' | '\r') || c.is_eos());
    ctx.cursor.eat_eol();

    let list_idx = ensure_list(state, out);
    let term = Node::new(Tag::DefinitionTerm).with_arg_list(children);
    current_list(out, list_idx).push(term);
    true
}

/// `: description text`, continuation lines indented or simply following
/// without a blank line extend the current description's block content.
pub(super) fn try_description(
    ctx: &mut ParserContext,
    state: &mut BlockState,
    out: &mut Vec<Value>,
) -> bool {
    let start = ctx.cursor.pos();
    if ctx.cursor.ch() != ':' {
        return false;
    }
    ctx.cursor.next();
    if ctx.cursor.ch() == ' ' {
        ctx.cursor.next();
    } else if !matches!(ctx.cursor.ch(), '\n' | '\r') && !ctx.cursor.is_eos() {
        ctx.cursor.set_pos(start);
        return false;
    }

    let children = inline::collect_until(ctx, false, |c| matches!(c.ch(), '\n' | '\r') || c.is_eos());
    ctx.cursor.eat_eol();

    let list_idx = ensure_list(state, out);
    let para = Node::new(Tag::Para).with_arg_list(children);
    let desc = Node::new(Tag::DefinitionDescription).with_arg(Node::new(Tag::Block).with_arg(para));
    current_list(out, list_idx).push(desc);
    true
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
    fn term_then_description() {
        let doc = parse(";term\n:description\n");
        assert_eq!(doc.args.len(), 1);
        let Value::Node(list) = &doc.args[0] else { panic!() };
        assert_eq!(list.tag, Tag::DefinitionList);
        assert_eq!(list.args.len(), 2);
        assert!(matches!(&list.args[0], Value::Node(n) if n.tag == Tag::DefinitionTerm));
        assert!(matches!(&list.args[1], Value::Node(n) if n.tag == Tag::DefinitionDescription));
    }

    #[test]
    fn blank_line_closes_the_list() {
        let doc = parse(";term\n:description\n\n;term2\n:description2\n");
        assert_eq!(doc.args.len(), 2);
    }
}
