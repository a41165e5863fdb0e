//! Horizontal rule (§4.3): `---` or more, optional attribute.

use crate::driver::ParserContext;
use crate::tree::{Node, Tag, Value};

pub(super) fn try_hr(ctx: &mut ParserContext, out: &mut Vec<Value>) -> bool {
    let start = ctx.cursor.pos();
    let mut count = 0u32;
    while ctx.cursor.ch() == '-' {
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
    out.push(Value::Node(Node::new(Tag::Thematic).with_arg(attrs)));
    true
}
