//! The block parser (component C5, §4.3).
//!
//! A recursive-descent driver: the top-level loop reads blocks from the
//! cursor until EOS (or, for a region's body, until its own closing
//! fence), dispatching on the first rune of the line. A `last_para` index
//! tracks the most recently produced paragraph so continuation lines can
//! extend it in place instead of starting a new one.

mod definition;
mod heading;
mod hr;
mod list;
mod region;
mod table;
mod transclude;
mod verbatim;

use crate::attributes::{parse_attributes, shortcut_attrs};
use crate::cursor::EOS;
use crate::driver::ParserContext;
use crate::inline;
use crate::tree::{Attributes, Node, Tag, Value};

/// Mutable state threaded through one top-level (or one region-body) block
/// parse: the list-kind stack and the table row accumulator. Kept out of
/// [`ParserContext`] since nothing outside the block parser ever needs to
/// see it (driver.rs's own doc comment explains the reasoning).
#[derive(Default)]
pub(crate) struct BlockState {
    pub(crate) lists: list::ListStack,
    pub(crate) table: table::TableAccumulator,
    pub(crate) definitions: definition::DefinitionState,
    /// Index into the output vector of the paragraph a same-paragraph
    /// continuation line should extend, if any.
    pub(crate) last_para: Option<usize>,
}

/// `ParseBlocks`'s entry point: parse the whole document.
pub fn parse_document(ctx: &mut ParserContext) -> Node {
    let mut out = Vec::new();
    let mut state = BlockState::default();
    parse_block_list(ctx, &mut state, &mut out, |_| false);
    flush_all(&mut state, &mut out);
    Node {
        tag: Tag::Block,
        args: out,
    }
}

/// Parse blocks into `out` until `stop` reports true or EOS — shared by
/// the top-level document loop and region bodies (§4.3's `(<REGION-TAG>
/// attrs (BLOCK children…) …)`).
pub(crate) fn parse_block_list(
    ctx: &mut ParserContext,
    state: &mut BlockState,
    out: &mut Vec<Value>,
    mut stop: impl FnMut(&mut ParserContext) -> bool,
) {
    loop {
        if ctx.cursor.is_eos() || stop(ctx) {
            break;
        }
        parse_one_block(ctx, state, out);
    }
}

pub(crate) fn flush_all(state: &mut BlockState, out: &mut Vec<Value>) {
    table::flush(state, out);
    list::flush_all(state, out);
}

/// Shared by HR/region/verbatim openers: an optional attribute clause
/// (shortcut bareword or `{…}`) followed by nothing but the line's EOL.
/// `None` means the trailer was malformed and the whole construct fails.
pub(crate) fn parse_fence_trailer(ctx: &mut ParserContext) -> Option<Attributes> {
    while matches!(ctx.cursor.ch(), ' ' | '\t') {
        ctx.cursor.next();
    }
    if ctx.cursor.ch() == '{' {
        let attrs = parse_attributes(&mut ctx.cursor)?;
        while matches!(ctx.cursor.ch(), ' ' | '\t') {
            ctx.cursor.next();
        }
        if matches!(ctx.cursor.ch(), '\n' | '\r') || ctx.cursor.is_eos() {
            Some(attrs)
        } else {
            None
        }
    } else if matches!(ctx.cursor.ch(), '\n' | '\r') || ctx.cursor.is_eos() {
        Some(Attributes::default())
    } else {
        let start = ctx.cursor.pos();
        while !matches!(ctx.cursor.ch(), '\n' | '\r') && !ctx.cursor.is_eos() {
            ctx.cursor.next();
        }
        let token = ctx.cursor.src()[start..ctx.cursor.pos()].trim_end().to_string();
        Some(shortcut_attrs(&token))
    }
}

/// Dispatch a single line by its first rune (§4.3's table) and advance the
/// cursor past whatever it produced.
fn parse_one_block(ctx: &mut ParserContext, state: &mut BlockState, out: &mut Vec<Value>) {
    let ch = ctx.cursor.ch();

    // A blank line ends any running list/table context and never
    // continues a paragraph.
    if matches!(ch, '\n' | '\r') {
        ctx.cursor.eat_eol();
        flush_all(state, out);
        definition::close(state);
        state.last_para = None;
        return;
    }

    // Lines that don't open a list/table construct close any open one —
    // "dispatching certain block kinds clears the list stack, the table
    // accumulator, or both" (§4.3).
    let continues_list = list::looks_like_continuation(ctx, state);
    if !continues_list {
        list::flush_all(state, out);
    }
    if ch != '|' {
        table::flush(state, out);
    }
    if !matches!(ch, ';' | ':') {
        definition::close(state);
    }

    if continues_list && list::try_continue(ctx, state, out) {
        return;
    }

    let handled = match ch {
        '=' => heading::try_heading(ctx, out),
        '-' => hr::try_hr(ctx, out),
        ':' => region::try_region(ctx, out) || definition::try_description(ctx, state, out),
        '"' | '<' => region::try_region(ctx, out),
        '@' | '`' | '%' | '~' | '$' => verbatim::try_verbatim(ctx, out),
        '*' | '#' | '>' => list::try_start(ctx, state, out),
        ';' => definition::try_term(ctx, state, out),
        '|' => table::try_row(ctx, state, out),
        '{' => transclude::try_transclude(ctx, out),
        _ => false,
    };

    if !handled {
        parse_paragraph(ctx, state, out);
    }
}

/// Read inlines until a `(SOFT)`/`(HARD)` is followed by a rune that opens
/// some other block construct. Same-paragraph continuation (no leading
/// `(SPACE)(SOFT)` pair) appends in place to `last_para` instead of
/// starting a new `PARA`.
fn parse_paragraph(ctx: &mut ParserContext, state: &mut BlockState, out: &mut Vec<Value>) {
    let start_of_line = ctx.cursor.at_line_start();
    let children = inline::collect_until(ctx, false, |c| {
        c.is_eos() || (matches!(c.ch(), '\n' | '\r') && starts_new_block_after_eol(c))
    });

    if children.is_empty() {
        return;
    }

    let continues = start_of_line
        && state.last_para.is_some()
        && !matches!(children.first(), Some(v) if v.is_space());

    if continues {
        if let Some(idx) = state.last_para {
            if let Some(Value::Node(n)) = out.get_mut(idx) {
                n.args.extend(children);
                return;
            }
        }
    }

    out.push(Value::Node(Node::new(Tag::Para).with_arg_list(children)));
    state.last_para = Some(out.len() - 1);
}

/// Peek past the line terminator the paragraph loop is sitting on to see
/// whether the *next* line opens a block construct (rather than more
/// paragraph text) — used only to decide where a paragraph's inline run
/// ends, never to consume anything.
fn starts_new_block_after_eol(cursor: &crate::cursor::Cursor) -> bool {
    let mut probe = cursor.clone();
    probe.eat_eol();
    match probe.ch() {
        EOS => true,
        '\n' | '\r' => true,
        '=' | '-' | ':' | '"' | '<' | '@' | '`' | '%' | '~' | '$' | '*' | '#' | '>' | ';' | '|'
        | '{' => true,
        _ => false,
    }
}
