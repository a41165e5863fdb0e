//! Verbatim blocks (§4.3): `@@@`, `` ``` ``, `%%%`, `~~~`, `$$$` — content
//! is captured as raw lines, with no inline parsing, until a closing
//! fence of at least the opener's rune count appears at column 0.

use crate::driver::ParserContext;
use crate::tree::{Node, Tag, Value};

fn verbatim_tag(delim: char) -> Tag {
    match delim {
        '@' => Tag::VerbatimZettel,
        '`' => Tag::VerbatimProg,
        '%' => Tag::VerbatimComment,
        '~' => Tag::VerbatimEval,
        '$' => Tag::VerbatimMath,
        _ => unreachable!("verbatim_tag called with non-verbatim delimiter"),
    }
}

pub(super) fn try_verbatim(ctx: &mut ParserContext, out: &mut Vec<Value>) -> bool {
    let ch = ctx.cursor.ch();
    if !matches!(ch, '@' | '`' | '%' | '~' | '$') {
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

    let mut content = String::new();
    loop {
        if ctx.cursor.is_eos() {
            log::debug!("zmk: unterminated verbatim block (opener was {} x{count})", ch);
            break;
        }
        if ctx.cursor.at_line_start() && closing_fence_len(ctx, ch) >= count {
            let mut n = 0u32;
            while ctx.cursor.ch() == ch {
                ctx.cursor.next();
                n += 1;
            }
            let _ = n;
            while matches!(ctx.cursor.ch(), ' ' | '\t') {
                ctx.cursor.next();
            }
            ctx.cursor.eat_eol();
            break;
        }
        let line_start = ctx.cursor.pos();
        ctx.cursor.skip_to_eol();
        content.push_str(&ctx.cursor.src()[line_start..ctx.cursor.pos()]);
        if !ctx.cursor.is_eos() {
            content.push('\n');
            ctx.cursor.eat_eol();
        }
    }

    let mut node = Node::new(verbatim_tag(ch));
    node.push(attrs);
    node.push(Value::Text(content));
    out.push(Value::Node(node));
    true
}

fn closing_fence_len(ctx: &ParserContext, ch: char) -> u32 {
    let mut n = 0usize;
    while ctx.cursor.peek_n(n) == ch {
        n += 1;
    }
    n as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    #[test]
    fn code_block_captures_raw_lines() {
        let mut ctx = ParserContext::new("```\nfn x() {}\n```\n", ParserConfig::default());
        let mut out = Vec::new();
        assert!(try_verbatim(&mut ctx, &mut out));
        let Value::Node(n) = &out[0] else { panic!() };
        assert_eq!(n.tag, Tag::VerbatimProg);
        assert_eq!(n.args[1], Value::Text("fn x() {}".to_string()));
    }

    #[test]
    fn content_is_not_inline_parsed() {
        let mut ctx = ParserContext::new("~~~\n**not strong**\n~~~\n", ParserConfig::default());
        let mut out = Vec::new();
        assert!(try_verbatim(&mut ctx, &mut out));
        let Value::Node(n) = &out[0] else { panic!() };
        assert_eq!(n.args[1], Value::Text("**not strong**".to_string()));
    }

    #[test]
    fn too_short_fails() {
        let mut ctx = ParserContext::new("``\n", ParserConfig::default());
        let pos = ctx.cursor.pos();
        let mut out = Vec::new();
        assert!(!try_verbatim(&mut ctx, &mut out));
        assert_eq!(ctx.cursor.pos(), pos);
    }
}
