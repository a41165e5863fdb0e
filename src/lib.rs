//! ZMK: a recursive-descent block-and-inline parser for Zettelmarkup.
//!
//! The two entry points mirror the spec's `ParseBlocks`/`ParseInlines`:
//! [`parse_blocks`] parses a whole document into the canonical `(BLOCK
//! ...)` tree; [`parse_inlines`] parses a bare run of inline content with
//! no block-level dispatch. Both degrade malformed input to literal text
//! rather than failing — see [`error`] for the one class of error this
//! crate does raise (an internal invariant violation).

pub mod attributes;
pub mod block;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod html_entities;
pub mod inline;
pub mod postprocess;
pub mod reference;
pub mod tree;

pub use config::ParserConfig;
pub use driver::{parse_blocks, parse_blocks_with_config, parse_inlines, parse_inlines_with_config};
pub use tree::{Attributes, Node, Tag, Value};
