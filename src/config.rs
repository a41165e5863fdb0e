//! Parser configuration (§6.2).

/// The spec's `MAX_NESTING_LEVEL` — the cap on recursive block/inline
/// parser re-entry before a construct is forced into literal-paragraph
/// interpretation (§5, §7).
pub const DEFAULT_MAX_NESTING: u32 = 50;

/// Tunable knobs for a single parse. There is deliberately only one knob
/// today; this exists as a seam so the nesting-budget edge case (§8) can
/// be exercised with a small limit instead of constructing 50 levels of
/// real input for every test that needs it.
#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
    pub max_nesting: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}
