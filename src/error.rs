//! The one error type this crate ever raises on purpose.
//!
//! Per the parser's error-handling policy, malformed Zettelmarkup never
//! produces a `Result::Err` — it degrades to literal text (see
//! [`crate::block`] and [`crate::inline`]). The only thing that reaches this
//! module is an *invariant violation*: a node tag the post-processor does
//! not recognize, or a nesting counter that didn't return to zero. Both
//! indicate a bug in this crate, not bad input, so they are fatal.

use thiserror::Error;

use crate::tree::Tag;

/// A programmer error: something this crate's own invariants guarantee
/// cannot happen, happened anyway.
#[derive(Debug, Error)]
pub enum FatalParseError {
    #[error("post-processor received an unknown or unreachable tag: {0:?}")]
    UnknownTag(Tag),

    #[error("nesting counter imbalance: expected 0 at top level, found {0}")]
    NestingImbalance(u32),
}

/// Log the violation and abort the process.
///
/// This is the Rust expression of spec §7's "fatal; abort with a diagnostic
/// identifying the offending node": log first (so an embedding application's
/// log sink sees it even though the process is about to unwind), then panic.
pub fn fatal(err: FatalParseError) -> ! {
    log::error!("zmk: invariant violation: {err}");
    panic!("zmk: invariant violation: {err}");
}
