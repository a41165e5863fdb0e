//! The driver (component C7, §6) and the shared parser context (§5).
//!
//! A `ParserContext` owns everything a single parse touches: the cursor,
//! the bounded-recursion counter, and the verse flag. The block parser's
//! list stack and table accumulator (§4.3) are owned locally by
//! [`crate::block::parse_blocks_into`] instead of living here, since
//! nothing outside the block parser ever needs to see them — keeping them
//! off the shared context avoids giving every inline-parser call a reason
//! to borrow fields it never touches.

use crate::block;
use crate::config::ParserConfig;
use crate::cursor::Cursor;
use crate::inline;
use crate::postprocess::PostProcessor;
use crate::tree::{Node, Tag};

/// Parse context threaded through the whole recursive descent. Lives only
/// for the duration of one [`parse_blocks`]/[`parse_inlines`] call.
pub struct ParserContext<'a> {
    pub cursor: Cursor<'a>,
    pub config: ParserConfig,
    nesting: u32,
}

impl<'a> ParserContext<'a> {
    pub fn new(src: &'a str, config: ParserConfig) -> Self {
        Self {
            cursor: Cursor::new(src),
            config,
            nesting: 0,
        }
    }

    /// Enter one more level of recursive parsing. Returns `None` (without
    /// mutating the counter) once the nesting budget (§5, §7) is
    /// exhausted, so the caller falls back to a literal interpretation of
    /// the construct exactly like any other syntactic non-match.
    pub fn enter(&mut self) -> Option<NestingGuard<'_, 'a>> {
        if self.nesting >= self.config.max_nesting {
            log::trace!(
                "zmk: nesting budget ({}) exhausted; falling back to literal text",
                self.config.max_nesting
            );
            return None;
        }
        self.nesting += 1;
        Some(NestingGuard { ctx: self })
    }

    #[cfg(test)]
    pub fn nesting_depth(&self) -> u32 {
        self.nesting
    }

    /// Current recursion depth, carried across a re-lex of an extracted
    /// sub-string (e.g. a reference's `TEXT|` half, §4.2) so the nesting
    /// budget still applies to the document as a whole rather than
    /// resetting at each re-lexed boundary.
    pub(crate) fn nesting(&self) -> u32 {
        self.nesting
    }

    pub(crate) fn set_nesting(&mut self, n: u32) {
        self.nesting = n;
    }
}

/// RAII guard for one level of recursion: decrements the shared counter on
/// drop so an early `return`/`?` bail-out can never leave it unbalanced.
/// Derefs to the context so recursive calls read naturally as
/// `inner_parse(&mut guard)`.
pub struct NestingGuard<'ctx, 'a> {
    ctx: &'ctx mut ParserContext<'a>,
}

impl<'ctx, 'a> std::ops::Deref for NestingGuard<'ctx, 'a> {
    type Target = ParserContext<'a>;
    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'ctx, 'a> std::ops::DerefMut for NestingGuard<'ctx, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl<'ctx, 'a> Drop for NestingGuard<'ctx, 'a> {
    fn drop(&mut self) {
        self.ctx.nesting -= 1;
    }
}

/// `ParseBlocks`: parse a byte buffer as a full Zettelmarkup document.
/// Returns the canonical `(BLOCK ...)` tree, or `None` for an empty
/// document (data model invariant 1).
pub fn parse_blocks(input: &[u8]) -> Option<Node> {
    parse_blocks_with_config(input, ParserConfig::default())
}

pub fn parse_blocks_with_config(input: &[u8], config: ParserConfig) -> Option<Node> {
    let text = String::from_utf8_lossy(input);
    let mut ctx = ParserContext::new(&text, config);
    let raw = block::parse_document(&mut ctx);
    debug_assert_eq!(
        ctx.nesting, 0,
        "nesting counter must return to zero at the end of a top-level parse"
    );
    PostProcessor::new().process_block(raw, false)
}

/// `ParseInlines`: parse a byte buffer as pure inline content, with no
/// block-level dispatch. Returns `(INLINE children...)`, or `None` if
/// nothing survives post-processing.
pub fn parse_inlines(input: &[u8]) -> Option<Node> {
    parse_inlines_with_config(input, ParserConfig::default())
}

pub fn parse_inlines_with_config(input: &[u8], config: ParserConfig) -> Option<Node> {
    let text = String::from_utf8_lossy(input);
    let mut ctx = ParserContext::new(&text, config);
    let children = inline::collect_inlines(&mut ctx, false);
    let processed = PostProcessor::new().process_inline(children, false);
    if processed.is_empty() {
        None
    } else {
        Some(Node {
            tag: Tag::Inline,
            args: processed,
        })
    }
}
