//! Tables (§4.3): `|`-delimited rows, accumulated across consecutive lines
//! and flushed into `(TABLE header-row body-rows)`. Since the tag
//! vocabulary has no `ROW`, a row is itself a `(TABLE cell...)` node — the
//! header-row slot is one such node (empty if there's no header row), and
//! the body-rows slot is a `(TABLE row...)` node holding the rest. The
//! first row is the header row only when every one of its cells is
//! `=`-marked; a row of only `%`/`|` runs is a separator, consumed
//! silently.

use super::BlockState;
use crate::driver::ParserContext;
use crate::inline;
use crate::tree::{Node, Tag, Value};

#[derive(Default)]
pub(crate) struct TableAccumulator {
    rows: Vec<(Node, bool)>,
}

pub(super) fn try_row(ctx: &mut ParserContext, state: &mut BlockState, _out: &mut Vec<Value>) -> bool {
    let start = ctx.cursor.pos();
    if ctx.cursor.ch() != '|' {
        return false;
    }
    ctx.cursor.next();

    if is_separator_row(ctx) {
        skip_to_eol(ctx);
        return true;
    }

    let mut cells = Vec::new();
    let mut all_header = true;
    loop {
        let (cell, header, align) = scan_cell(ctx);
        all_header &= header;
        let tag = match align {
            Align::Left => Tag::CellLeft,
            Align::Right => Tag::CellRight,
            Align::None => Tag::Cell,
        };
        cells.push(Value::Node(Node::new(tag).with_arg_list(cell)));

        if ctx.cursor.ch() == '|' {
            ctx.cursor.next();
            if matches!(ctx.cursor.ch(), '\n' | '\r') || ctx.cursor.is_eos() {
                break;
            }
            continue;
        }
        break;
    }
    ctx.cursor.eat_eol();

    if cells.is_empty() {
        ctx.cursor.set_pos(start);
        return false;
    }
    let row = Node::new(Tag::Table).with_arg_list(cells);
    state.table.rows.push((row, all_header));
    true
}

enum Align {
    None,
    Left,
    Right,
}

/// A row consisting of nothing but `%` and `|` runs: a visual separator,
/// consumed without producing a row node.
fn is_separator_row(ctx: &ParserContext) -> bool {
    if ctx.cursor.peek_n(0) != '%' {
        return false;
    }
    let mut n = 0usize;
    loop {
        match ctx.cursor.peek_n(n) {
            '%' | '|' => n += 1,
            '\n' | '\r' | crate::cursor::EOS => return true,
            _ => return false,
        }
    }
}

fn skip_to_eol(ctx: &mut ParserContext) {
    ctx.cursor.skip_to_eol();
    ctx.cursor.eat_eol();
}

/// One cell's content, stopping at the next unescaped `|`, EOL, or EOS.
/// A leading `=` marks a header cell; a leading `<`/`>` sets alignment.
fn scan_cell(ctx: &mut ParserContext) -> (Vec<Value>, bool, Align) {
    while ctx.cursor.ch() == ' ' {
        ctx.cursor.next();
    }
    let header = if ctx.cursor.ch() == '=' {
        ctx.cursor.next();
        true
    } else {
        false
    };
    let align = match ctx.cursor.ch() {
        '<' => {
            ctx.cursor.next();
            Align::Left
        }
        '>' => {
            ctx.cursor.next();
            Align::Right
        }
        _ => Align::None,
    };
    let children = inline::collect_until(ctx, false, |c| {
        matches!(c.ch(), '|' | '\n' | '\r') || c.is_eos()
    });
    (children, header, align)
}

pub(crate) fn flush(state: &mut BlockState, out: &mut Vec<Value>) {
    if state.table.rows.is_empty() {
        return;
    }
    let mut rows = std::mem::take(&mut state.table.rows);
    let header = if rows.first().is_some_and(|(_, is_header)| *is_header) {
        rows.remove(0).0
    } else {
        Node::new(Tag::Table)
    };
    let body = Node::new(Tag::Table).with_arg_list(rows.into_iter().map(|(row, _)| Value::Node(row)));
    let node = Node::new(Tag::Table).with_arg(header).with_arg(body);
    out.push(Value::Node(node));
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
    fn single_row_table_has_no_header() {
        let doc = parse("|a|b|\n");
        let Value::Node(table) = &doc.args[0] else { panic!() };
        assert_eq!(table.tag, Tag::Table);
        assert_eq!(table.args.len(), 2);
        let Value::Node(header) = &table.args[0] else { panic!() };
        assert!(header.args.is_empty());
        let Value::Node(body) = &table.args[1] else { panic!() };
        assert_eq!(body.args.len(), 1);
    }

    #[test]
    fn header_row_is_split_out() {
        let doc = parse("|=a|=b|\n|1|2|\n");
        let Value::Node(table) = &doc.args[0] else { panic!() };
        let Value::Node(header) = &table.args[0] else { panic!() };
        assert_eq!(header.args.len(), 2);
        let Value::Node(body) = &table.args[1] else { panic!() };
        assert_eq!(body.args.len(), 1);
    }

    #[test]
    fn blank_line_flushes_table() {
        let doc = parse("|a|\n\n|b|\n");
        assert_eq!(doc.args.len(), 2);
    }

    #[test]
    fn separator_row_is_silently_consumed() {
        let doc = parse("|=a|\n|%%%|\n|1|\n");
        let Value::Node(table) = &doc.args[0] else { panic!() };
        let Value::Node(body) = &table.args[1] else { panic!() };
        assert_eq!(body.args.len(), 1);
    }
}
