//! Attribute sub-parser (component C3, §4.1).
//!
//! Parses a `{…}` clause into an [`Attributes`] mapping. Used by both the
//! block parser (heading/region/verbatim/HR/transclusion trailers) and the
//! inline parser (format/literal/link/embed trailers), which is why it's
//! a standalone module rather than folded into either.

use crate::cursor::Cursor;
use crate::tree::Attributes;

fn is_name_start(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn is_name_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == ':'
}

fn is_item_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn skip_whitespace(cursor: &mut Cursor) {
    while is_item_whitespace(cursor.ch()) {
        cursor.next();
    }
}

fn read_name(cursor: &mut Cursor) -> String {
    let start = cursor.pos();
    if is_name_start(cursor.ch()) {
        cursor.next();
        while is_name_continue(cursor.ch()) {
            cursor.next();
        }
    }
    cursor.src()[start..cursor.pos()].to_string()
}

/// Read an unquoted bareword value: anything up to the next whitespace run,
/// `}`, or EOS.
fn read_bareword_value(cursor: &mut Cursor) -> String {
    let start = cursor.pos();
    while !is_item_whitespace(cursor.ch()) && cursor.ch() != '}' && !cursor.is_eos() {
        cursor.next();
    }
    cursor.src()[start..cursor.pos()].to_string()
}

/// Read a `"…"` quoted value. Backslash escapes the closing quote (and any
/// other character); newlines inside are preserved verbatim. Returns `None`
/// on an unterminated quote.
fn read_quoted_value(cursor: &mut Cursor) -> Option<String> {
    debug_assert_eq!(cursor.ch(), '"');
    cursor.next();
    let mut value = String::new();
    loop {
        match cursor.ch() {
            crate::cursor::EOS => return None,
            '"' => {
                cursor.next();
                return Some(value);
            }
            '\\' => {
                cursor.next();
                if cursor.is_eos() {
                    return None;
                }
                value.push(cursor.ch());
                cursor.next();
            }
            ch => {
                value.push(ch);
                cursor.next();
            }
        }
    }
}

fn read_value(cursor: &mut Cursor) -> Option<String> {
    if cursor.ch() == '"' {
        read_quoted_value(cursor)
    } else {
        Some(read_bareword_value(cursor))
    }
}

/// Parse a `{…}` clause starting at `{`. On success, the cursor is left on
/// the rune after the closing `}`. On failure (unterminated quote, unmatched
/// brace, malformed item), the cursor is restored to the opening `{` and
/// `None` is returned — the caller then treats `{` as literal text, per the
/// local-recovery policy (§7).
pub fn parse_attributes(cursor: &mut Cursor) -> Option<Attributes> {
    debug_assert_eq!(cursor.ch(), '{');
    let start = cursor.pos();
    cursor.next();

    let mut attrs = Attributes::new();
    loop {
        skip_whitespace(cursor);
        match cursor.ch() {
            '}' => {
                cursor.next();
                return Some(attrs);
            }
            crate::cursor::EOS => {
                cursor.set_pos(start);
                return None;
            }
            '.' => {
                cursor.next();
                let name = read_name(cursor);
                if name.is_empty() {
                    cursor.set_pos(start);
                    return None;
                }
                attrs.add_class(name);
            }
            '=' => {
                cursor.next();
                match read_value(cursor) {
                    Some(value) => attrs.insert("", value),
                    None => {
                        cursor.set_pos(start);
                        return None;
                    }
                }
            }
            ch if is_name_start(ch) => {
                let name = read_name(cursor);
                if cursor.ch() == '=' {
                    cursor.next();
                    match read_value(cursor) {
                        Some(value) => attrs.insert(name, value),
                        None => {
                            cursor.set_pos(start);
                            return None;
                        }
                    }
                } else {
                    attrs.insert(name, "");
                }
            }
            _ => {
                cursor.set_pos(start);
                return None;
            }
        }
    }
}

/// The shortcut form some block constructs accept: a bare token right after
/// the opening delimiter, with no braces. Becomes a single `""=TOKEN` pair.
pub fn shortcut_attrs(token: &str) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("", token);
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Option<Attributes> {
        let mut cursor = Cursor::new(src);
        parse_attributes(&mut cursor)
    }

    #[test]
    fn class_shorthand() {
        let attrs = parse("{.warn}").unwrap();
        assert_eq!(attrs.get("class"), Some("warn"));
    }

    #[test]
    fn default_slot() {
        let attrs = parse("{=python}").unwrap();
        assert_eq!(attrs.get(""), Some("python"));
    }

    #[test]
    fn bare_name_has_empty_value() {
        let attrs = parse("{readonly}").unwrap();
        assert_eq!(attrs.get("readonly"), Some(""));
    }

    #[test]
    fn name_equals_value() {
        let attrs = parse("{width=80}").unwrap();
        assert_eq!(attrs.get("width"), Some("80"));
    }

    #[test]
    fn quoted_value_with_spaces_and_escape() {
        let attrs = parse(r#"{title="a \"b\" c"}"#).unwrap();
        assert_eq!(attrs.get("title"), Some("a \"b\" c"));
    }

    #[test]
    fn multiple_items_whitespace_separated() {
        let attrs = parse("{.a .b width=10}").unwrap();
        assert_eq!(attrs.get("class"), Some("a b"));
        assert_eq!(attrs.get("width"), Some("10"));
    }

    #[test]
    fn unterminated_quote_fails_and_restores_cursor() {
        let mut cursor = Cursor::new(r#"{title="oops}"#);
        let pos = cursor.pos();
        assert!(parse_attributes(&mut cursor).is_none());
        assert_eq!(cursor.pos(), pos);
        assert_eq!(cursor.ch(), '{');
    }

    #[test]
    fn unterminated_brace_fails() {
        assert!(parse("{.a").is_none());
    }
}
