//! Property-based invariant checks against the two public entry points.
//! These don't assert exact tree shapes (that's `seed_cases.rs`'s job) —
//! they assert properties that must hold for *any* input: the parser
//! never panics, never loops forever, and its post-processing invariants
//! (no adjacent TEXT nodes, no trailing break, re-serialization is
//! deterministic) hold no matter what bytes it's fed.

use proptest::prelude::*;
use zmk::postprocess::PostProcessor;
use zmk::{parse_blocks, parse_inlines, Tag, Value};

/// A markup-flavored string strategy: fragments drawn from constructs the
/// grammar actually recognizes (delimiters, brackets, fence runes) mixed
/// with plain words, rather than uniformly random bytes. Raw `String`
/// generation spends nearly all of proptest's shrinking budget on the
/// plain-text fallback path since almost no random byte sequence looks
/// like a fence or a bracketed reference; this strategy hits the
/// interesting dispatch branches (formatting, fences, references) far
/// more often.
fn markup_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]{1,8}".prop_map(|s| s),
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just("\n\n".to_string()),
        Just("**".to_string()),
        Just("__".to_string()),
        Just("``".to_string()),
        Just("==".to_string()),
        Just("{.x}".to_string()),
        Just("===".to_string()),
        Just("---".to_string()),
        Just(":::".to_string()),
        Just("\"\"\"".to_string()),
        Just("<<<".to_string()),
        Just("```".to_string()),
        Just("@@@".to_string()),
        Just("* ".to_string()),
        Just("# ".to_string()),
        Just("; ".to_string()),
        Just(": ".to_string()),
        Just("|".to_string()),
        Just("[[".to_string()),
        Just("]]".to_string()),
        Just("{{{".to_string()),
        Just("}}}".to_string()),
        Just("\\".to_string()),
        Just("&amp;".to_string()),
    ]
}

fn markup_document() -> impl Strategy<Value = String> {
    proptest::collection::vec(markup_fragment(), 0..40).prop_map(|parts| parts.concat())
}

/// Recursively check that no inline-container node holds two adjacent
/// `TEXT` children (invariant 5: adjacent text is always merged).
fn no_adjacent_text(args: &[Value]) -> bool {
    let mut prev_was_text = false;
    for v in args {
        if let Value::Node(n) = v {
            if n.tag == Tag::Text {
                if prev_was_text {
                    return false;
                }
                prev_was_text = true;
                continue;
            }
            if !no_adjacent_text(&n.args) {
                return false;
            }
        }
        prev_was_text = false;
    }
    true
}

/// Check that no inline-container node's last child is a trailing
/// `SPACE`/`SOFT`/`HARD` break (invariant 5).
fn no_trailing_break(args: &[Value]) -> bool {
    if matches!(args.last(), Some(v) if v.is_trailing_break()) {
        return false;
    }
    for v in args {
        if let Value::Node(n) = v {
            if !no_trailing_break(&n.args) {
                return false;
            }
        }
    }
    true
}

/// Check that every `TEXT` node in the tree carries a non-empty string
/// (invariant 2, spec.md:56).
fn no_empty_text(args: &[Value]) -> bool {
    for v in args {
        if let Value::Node(n) = v {
            if n.tag == Tag::Text {
                let Some(Value::Text(s)) = n.args.first() else {
                    return false;
                };
                if s.is_empty() {
                    return false;
                }
            }
            if !no_empty_text(&n.args) {
                return false;
            }
        }
    }
    true
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Parsing never panics on arbitrary markup-flavored input, and a
    /// non-empty source either yields a tree or cleanly yields `None`
    /// (never hangs — bounded by proptest's own timeout).
    #[test]
    fn parse_blocks_never_panics(s in markup_document()) {
        let _ = parse_blocks(s.as_bytes());
    }

    #[test]
    fn parse_inlines_never_panics(s in markup_document()) {
        let _ = parse_inlines(s.as_bytes());
    }

    /// Re-parsing a tree's JSON round-trip produces byte-identical JSON —
    /// the tree type carries no hidden non-deterministic state (e.g. a
    /// `HashMap` iteration order) that would make serialization unstable.
    #[test]
    fn json_round_trip_is_deterministic(s in markup_document()) {
        if let Some(doc) = parse_blocks(s.as_bytes()) {
            let once = serde_json::to_string(&doc).unwrap();
            let twice = serde_json::to_string(&doc).unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    /// Merged-text and dropped-trailing-break invariants hold on whatever
    /// tree comes out of an arbitrary input, not just on hand-picked
    /// fixtures.
    #[test]
    fn merged_text_and_no_trailing_break_hold(s in markup_document()) {
        if let Some(doc) = parse_blocks(s.as_bytes()) {
            prop_assert!(no_adjacent_text(&doc.args));
            prop_assert!(no_trailing_break(&doc.args));
        }
    }

    /// Invariant 2 (spec.md:56): every `TEXT` node in the canonical tree
    /// carries a non-empty string, no matter what input produced it.
    #[test]
    fn text_nodes_are_never_empty(s in markup_document()) {
        if let Some(doc) = parse_blocks(s.as_bytes()) {
            prop_assert!(no_empty_text(&doc.args));
        }
    }

    /// Invariant 1 (spec.md:252): `PostProcess(Parse(src))` is a fixpoint —
    /// running the post-processor again over an already-normalized tree
    /// changes nothing, since every production it normalizes (adjacent
    /// TEXT, trailing breaks, elidable empties) is already in normal form.
    #[test]
    fn postprocessing_is_a_fixpoint(s in markup_document()) {
        if let Some(doc) = parse_blocks(s.as_bytes()) {
            let once = serde_json::to_string(&doc).unwrap();
            let reprocessed = PostProcessor::new().process_block(doc, false);
            let twice = reprocessed.map(|d| serde_json::to_string(&d).unwrap());
            prop_assert_eq!(Some(once), twice);
        }
    }

    /// A run of doubled formatting delimiters, however deeply nested or
    /// malformed, never panics and never exceeds a document-sized bound
    /// on parse time (indirectly verified by proptest's own timeout) —
    /// exercising the bounded-recursion guard against pathological input.
    #[test]
    fn pathological_nesting_is_bounded(n in 0usize..300) {
        let src = "__".repeat(n) + "x" + &"__".repeat(n);
        let _ = parse_inlines(src.as_bytes());
    }

    /// Same guard, exercised at the block level: a deeply nested run of
    /// `:::` region openers must not grow the native call stack past the
    /// nesting budget, however many times the opener repeats.
    #[test]
    fn pathological_region_nesting_is_bounded(n in 0usize..2000) {
        let src = ":::\n".repeat(n) + "x\n" + &":::\n".repeat(n);
        let _ = parse_blocks(src.as_bytes());
    }

    /// Every character of the original source is accounted for in some
    /// form: a non-empty input that the parser accepts must not collapse
    /// to `None` except when it's pure whitespace the grammar discards.
    #[test]
    fn non_whitespace_input_produces_a_tree(s in "[a-zA-Z0-9]{1,200}") {
        prop_assert!(parse_blocks(s.as_bytes()).is_some());
    }
}
