//! The URL/Zettel-id reference parser (external collaborator, §1/§6).
//!
//! `spec.md` names `ParseReference` as something this parser calls but
//! never implements — in Zettelstore proper it resolves against a live
//! zettel index (does this ID exist? is this a query? a hosted asset?).
//! This crate has no such index to resolve against, so `parse_reference`
//! implements the syntactic half of that classification only: scheme
//! detection, the zettel-id shape, the query prefix, and fragment/
//! root-relative forms. Anything that would require consulting a zettel
//! store is resolved to [`ReferenceKind::Found`] (the optimistic default)
//! rather than guessed at — recorded as an open-question resolution in
//! DESIGN.md. The one case that doesn't need an index to fail is an
//! explicit `zettel:` scheme whose id doesn't have the 14-digit shape;
//! that's classified [`ReferenceKind::Broken`] directly.

use crate::tree::Tag;

/// Which `LINK-*` / reference tag a reference should be rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    External,
    Zettel,
    Query,
    Broken,
    Found,
    Hosted,
    Invalid,
    SelfRef,
    Based,
}

impl ReferenceKind {
    pub fn link_tag(self) -> Tag {
        match self {
            ReferenceKind::External => Tag::LinkExternal,
            ReferenceKind::Zettel => Tag::LinkZettel,
            ReferenceKind::Query => Tag::LinkQuery,
            ReferenceKind::Broken => Tag::LinkBroken,
            ReferenceKind::Found => Tag::LinkFound,
            ReferenceKind::Hosted => Tag::LinkHosted,
            ReferenceKind::Invalid => Tag::LinkInvalid,
            ReferenceKind::SelfRef => Tag::LinkSelf,
            ReferenceKind::Based => Tag::LinkBased,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub value: String,
}

const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "mailto:", "tel:"];

/// A Zettelstore zettel id: exactly 14 ASCII digits.
fn looks_like_zettel_id(s: &str) -> bool {
    s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a raw reference string (the text between a link/embed/cite's
/// delimiters, already unescaped) the way `ParseReference` would.
pub fn parse_reference(text: &str) -> Reference {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Reference {
            kind: ReferenceKind::Invalid,
            value: text.to_string(),
        };
    }

    if trimmed.contains(char::is_control) {
        return Reference {
            kind: ReferenceKind::Invalid,
            value: text.to_string(),
        };
    }

    if let Some(rest) = trimmed.strip_prefix("query:") {
        return Reference {
            kind: ReferenceKind::Query,
            value: rest.to_string(),
        };
    }

    // An explicit `zettel:` scheme commits to the zettel-id shape; one
    // that doesn't match it can be classified `Broken` without consulting
    // any index, since the scheme itself rules out every other kind.
    if let Some(rest) = trimmed.strip_prefix("zettel:") {
        return if looks_like_zettel_id(rest) {
            Reference {
                kind: ReferenceKind::Zettel,
                value: rest.to_string(),
            }
        } else {
            Reference {
                kind: ReferenceKind::Broken,
                value: rest.to_string(),
            }
        };
    }

    if URL_SCHEMES.iter().any(|s| trimmed.starts_with(s)) {
        return Reference {
            kind: ReferenceKind::External,
            value: trimmed.to_string(),
        };
    }

    if let Some(rest) = trimmed.strip_prefix('#') {
        return Reference {
            kind: ReferenceKind::SelfRef,
            value: rest.to_string(),
        };
    }

    if let Some(rest) = trimmed.strip_prefix("//") {
        return Reference {
            kind: ReferenceKind::Hosted,
            value: rest.to_string(),
        };
    }

    if let Some(rest) = trimmed.strip_prefix('/') {
        return Reference {
            kind: ReferenceKind::Based,
            value: rest.to_string(),
        };
    }

    if looks_like_zettel_id(trimmed) {
        return Reference {
            kind: ReferenceKind::Zettel,
            value: trimmed.to_string(),
        };
    }

    // No local index to check existence against: assume the reference
    // resolves (`Found`) rather than flagging it `Broken`. A caller with a
    // real zettel index can re-classify after the fact.
    Reference {
        kind: ReferenceKind::Found,
        value: trimmed.to_string(),
    }
}
