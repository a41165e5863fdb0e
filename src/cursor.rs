//! Input cursor (component C1).
//!
//! `spec.md` treats the cursor as an external collaborator reached only
//! through a narrow contract: current rune, position, lookahead, EOL
//! handling, entity scanning. This crate has no sibling package to import
//! that contract from, so it's implemented here — but the rest of the
//! crate still only ever calls these methods, never indexes `Cursor::src`
//! directly, so the contract boundary is real even though the
//! implementation lives in-tree.

use crate::html_entities::lookup_entity;

/// Sentinel returned by [`Cursor::ch`] at end of input.
pub const EOS: char = '\0';

/// A byte-buffer cursor over UTF-8 text, tracking the current `char` and
/// its byte position, with rewindable lookahead.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    ch: char,
    ch_len: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut cursor = Self {
            src,
            pos: 0,
            ch: EOS,
            ch_len: 0,
        };
        cursor.reload();
        cursor
    }

    fn reload(&mut self) {
        match self.src[self.pos..].chars().next() {
            Some(c) => {
                self.ch = c;
                self.ch_len = c.len_utf8();
            }
            None => {
                self.ch = EOS;
                self.ch_len = 0;
            }
        }
    }

    /// Current rune, or [`EOS`] at end of input.
    pub fn ch(&self) -> char {
        self.ch
    }

    /// Absolute byte offset of the current rune.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rewind (or fast-forward) to a previously observed position.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
        self.reload();
    }

    /// Advance past the current rune and return the new current rune.
    pub fn next(&mut self) -> char {
        if self.ch != EOS {
            self.pos += self.ch_len;
            self.reload();
        }
        self.ch
    }

    /// The rune after the current one, without consuming anything.
    pub fn peek(&self) -> char {
        self.peek_n(1)
    }

    /// The `n`th rune ahead (`peek_n(0)` is the current rune), without
    /// consuming anything.
    pub fn peek_n(&self, n: usize) -> char {
        self.src[self.pos..].chars().nth(n).unwrap_or(EOS)
    }

    /// Underlying byte slice, for slicing out raw content between two
    /// positions recorded via [`Cursor::pos`].
    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn is_eos(&self) -> bool {
        self.ch == EOS
    }

    /// True for `\n`, `\r`, or [`EOS`] — the common "stop here" predicate
    /// used throughout the block and inline parsers.
    pub fn is_eol_eos(ch: char) -> bool {
        matches!(ch, '\n' | '\r' | EOS)
    }

    /// Consume one line terminator: `\n`, `\r`, or `\r\n` (treated as a
    /// single EOL). No-op if the cursor isn't on a line terminator.
    pub fn eat_eol(&mut self) {
        match self.ch {
            '\r' => {
                self.next();
                if self.ch == '\n' {
                    self.next();
                }
            }
            '\n' => {
                self.next();
            }
            _ => {}
        }
    }

    /// Advance to (but not past) the next EOL or EOS.
    pub fn skip_to_eol(&mut self) {
        while !Self::is_eol_eos(self.ch) {
            self.next();
        }
    }

    /// True if the cursor is positioned right after a newline (or at the
    /// very start of input) — i.e. at column 0.
    pub fn at_line_start(&self) -> bool {
        self.pos == 0 || {
            let prev = self.src[..self.pos].chars().next_back();
            matches!(prev, Some('\n') | Some('\r'))
        }
    }

    /// Scan an `&…;` entity reference starting at the current `&`.
    ///
    /// Recognises named entities (via [`lookup_entity`]) and numeric forms
    /// `&#\d+;` / `&#x[0-9A-Fa-f]+;` whose codepoint is at least `U+0020`.
    /// On success, consumes the entity and returns its replacement text.
    /// On failure, the cursor is left untouched.
    pub fn scan_entity(&mut self) -> Option<String> {
        debug_assert_eq!(self.ch, '&');
        let start = self.pos;
        let mut probe = self.clone();
        probe.next();

        let replacement = if probe.ch == '#' {
            probe.next();
            let (radix, digits_start) = if matches!(probe.ch, 'x' | 'X') {
                probe.next();
                (16, probe.pos)
            } else {
                (10, probe.pos)
            };
            while probe.ch.is_digit(radix) {
                probe.next();
            }
            if probe.pos == digits_start || probe.ch != ';' {
                None
            } else {
                let digits = &probe.src()[digits_start..probe.pos];
                u32::from_str_radix(digits, radix)
                    .ok()
                    .filter(|&cp| cp >= 0x20)
                    .and_then(char::from_u32)
                    .map(|c| {
                        probe.next(); // consume ';'
                        c.to_string()
                    })
            }
        } else {
            let name_start = probe.pos;
            while probe.ch.is_ascii_alphanumeric() {
                probe.next();
            }
            if probe.pos == name_start || probe.ch != ';' {
                None
            } else {
                let name = &probe.src()[name_start..probe.pos];
                lookup_entity(name).map(|text| {
                    probe.next(); // consume ';'
                    text.to_string()
                })
            }
        };

        match replacement {
            Some(text) => {
                self.set_pos(probe.pos);
                Some(text)
            }
            None => {
                self.set_pos(start);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_and_next_advance_independently() {
        let mut c = Cursor::new("ab");
        assert_eq!(c.ch(), 'a');
        assert_eq!(c.peek(), 'b');
        assert_eq!(c.next(), 'b');
        assert_eq!(c.next(), EOS);
        assert!(c.is_eos());
    }

    #[test]
    fn eat_eol_handles_crlf_as_one() {
        let mut c = Cursor::new("\r\nx");
        c.eat_eol();
        assert_eq!(c.ch(), 'x');
    }

    #[test]
    fn scan_named_entity() {
        let mut c = Cursor::new("&hellip;y");
        assert_eq!(c.scan_entity().as_deref(), Some("\u{2026}"));
        assert_eq!(c.ch(), 'y');
    }

    #[test]
    fn scan_entity_failure_leaves_cursor_untouched() {
        let mut c = Cursor::new("&nope y");
        let pos = c.pos();
        assert_eq!(c.scan_entity(), None);
        assert_eq!(c.pos(), pos);
    }

    #[test]
    fn numeric_entity_below_space_fails() {
        let mut c = Cursor::new("&#9;y");
        assert_eq!(c.scan_entity(), None);
    }
}
