//! A small named-HTML-entity table, consulted by [`crate::cursor::Cursor::scan_entity`].
//!
//! This is not an attempt at the full HTML5 entity list (over 2,000 names);
//! it covers the entities that show up in real Zettelmarkup notes —
//! punctuation, a handful of accented Latin letters, and the usual HTML
//! escapes. Anything else falls through to the numeric `&#...;` form or
//! fails and is left as literal text, per §4.2.

const ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{00A0}"),
    ("hellip", "\u{2026}"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("copy", "\u{00A9}"),
    ("reg", "\u{00AE}"),
    ("trade", "\u{2122}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201C}"),
    ("rdquo", "\u{201D}"),
    ("laquo", "\u{00AB}"),
    ("raquo", "\u{00BB}"),
    ("middot", "\u{00B7}"),
    ("deg", "\u{00B0}"),
    ("plusmn", "\u{00B1}"),
    ("times", "\u{00D7}"),
    ("divide", "\u{00F7}"),
    ("eacute", "\u{00E9}"),
    ("egrave", "\u{00E8}"),
    ("agrave", "\u{00E0}"),
    ("uuml", "\u{00FC}"),
    ("ouml", "\u{00F6}"),
    ("auml", "\u{00E4}"),
    ("szlig", "\u{00DF}"),
    ("euro", "\u{20AC}"),
    ("sect", "\u{00A7}"),
    ("para", "\u{00B6}"),
    ("dagger", "\u{2020}"),
    ("larr", "\u{2190}"),
    ("rarr", "\u{2192}"),
    ("uarr", "\u{2191}"),
    ("darr", "\u{2193}"),
];

/// Look up a named entity (the text between `&` and `;`, e.g. `"hellip"`).
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    ENTITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_entity_resolves() {
        assert_eq!(lookup_entity("hellip"), Some("\u{2026}"));
    }

    #[test]
    fn unknown_entity_is_none() {
        assert_eq!(lookup_entity("not-a-real-entity"), None);
    }
}
