//! Transclusion (§4.3): `{{{ REF }}}`, optionally followed by a trailing
//! `{…}` attribute clause. The reference is classified the same way a
//! link/embed's reference half is, then wrapped in an `EXTERNAL` node
//! (§3's data model) rather than a `LINK-*`/`EMBED` tag, since a
//! transclusion names what to pull in rather than how to render text.

use crate::attributes::parse_attributes;
use crate::driver::ParserContext;
use crate::reference::parse_reference;
use crate::tree::{Node, Tag, Value};

pub(super) fn try_transclude(ctx: &mut ParserContext, out: &mut Vec<Value>) -> bool {
    let start = ctx.cursor.pos();
    if !(ctx.cursor.ch() == '{' && ctx.cursor.peek() == '{' && ctx.cursor.peek_n(2) == '{') {
        return false;
    }
    ctx.cursor.next();
    ctx.cursor.next();
    ctx.cursor.next();

    let Some(raw) = scan_closing(ctx) else {
        ctx.cursor.set_pos(start);
        return false;
    };
    if raw.trim().is_empty() {
        ctx.cursor.set_pos(start);
        return false;
    }

    let attrs = if ctx.cursor.ch() == '{' {
        match parse_attributes(&mut ctx.cursor) {
            Some(a) => a,
            None => {
                ctx.cursor.set_pos(start);
                return false;
            }
        }
    } else {
        Default::default()
    };
    while matches!(ctx.cursor.ch(), ' ' | '\t') {
        ctx.cursor.next();
    }
    if !(matches!(ctx.cursor.ch(), '\n' | '\r') || ctx.cursor.is_eos()) {
        ctx.cursor.set_pos(start);
        return false;
    }
    ctx.cursor.eat_eol();

    let reference = parse_reference(raw.trim());
    let external = Node::new(Tag::External)
        .with_arg(Value::Text(format!("{:?}", reference.kind)))
        .with_arg(Value::Text(reference.value));

    let node = Node::new(Tag::Transclude)
        .with_arg(attrs)
        .with_arg(Value::Node(external));
    out.push(Value::Node(node));
    true
}

/// Raw-scan the reference between `{{{` and `}}}`, honouring `\X` escapes.
/// Fails on EOS or a line break before the closer is found.
fn scan_closing(ctx: &mut ParserContext) -> Option<String> {
    let mut raw = String::new();
    loop {
        if ctx.cursor.ch() == '}' && ctx.cursor.peek() == '}' && ctx.cursor.peek_n(2) == '}' {
            ctx.cursor.next();
            ctx.cursor.next();
            ctx.cursor.next();
            return Some(raw);
        }
        match ctx.cursor.ch() {
            crate::cursor::EOS | '\n' | '\r' => return None,
            '\\' => {
                ctx.cursor.next();
                if ctx.cursor.is_eos() {
                    return None;
                }
                raw.push(ctx.cursor.ch());
                ctx.cursor.next();
            }
            ch => {
                raw.push(ch);
                ctx.cursor.next();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    #[test]
    fn bare_transclude() {
        let mut ctx = ParserContext::new("{{{20230101120000}}}\n", ParserConfig::default());
        let mut out = Vec::new();
        assert!(try_transclude(&mut ctx, &mut out));
        let Value::Node(n) = &out[0] else { panic!() };
        assert_eq!(n.tag, Tag::Transclude);
        let Value::Node(ext) = &n.args[1] else { panic!() };
        assert_eq!(ext.tag, Tag::External);
    }

    #[test]
    fn empty_reference_fails() {
        let mut ctx = ParserContext::new("{{{}}}\n", ParserConfig::default());
        let pos = ctx.cursor.pos();
        let mut out = Vec::new();
        assert!(!try_transclude(&mut ctx, &mut out));
        assert_eq!(ctx.cursor.pos(), pos);
    }

    #[test]
    fn not_a_transclude_without_triple_brace() {
        let mut ctx = ParserContext::new("{{a}}\n", ParserConfig::default());
        let mut out = Vec::new();
        assert!(!try_transclude(&mut ctx, &mut out));
    }
}
