//! Data model shared by the resolver and the service layer.

use serde::{Deserialize, Serialize};

/// Byte range in article content, half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpan {
    /// Byte offset from start of content
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
}

impl LinkSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether two half-open ranges intersect.
    pub fn overlaps(&self, other: &LinkSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A globally whitelisted glossary term.
///
/// At most one *active* term may exist per `canonical_term_lower`; the
/// store layer enforces this with idempotent create semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistTerm {
    pub id: u64,
    pub canonical_term: String,
    /// Kept in sync with `canonical_term` on every update
    pub canonical_term_lower: String,
    pub standalone_title: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl WhitelistTerm {
    pub fn new(id: u64, canonical_term: impl Into<String>, standalone_title: impl Into<String>) -> Self {
        let canonical_term = canonical_term.into();
        let canonical_term_lower = canonical_term.to_lowercase();
        Self {
            id,
            canonical_term,
            canonical_term_lower,
            standalone_title: standalone_title.into(),
            description: None,
            is_active: true,
        }
    }
}

/// An alternate spelling owned by exactly one [`WhitelistTerm`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAlias {
    pub id: u64,
    /// Owning term id
    pub whitelist_id: u64,
    pub alias_term: String,
    pub alias_term_lower: String,
}

impl TermAlias {
    pub fn new(id: u64, whitelist_id: u64, alias_term: impl Into<String>) -> Self {
        let alias_term = alias_term.into();
        let alias_term_lower = alias_term.to_lowercase();
        Self {
            id,
            whitelist_id,
            alias_term,
            alias_term_lower,
        }
    }
}

/// What a per-article override does to a term.
///
/// A custom title is part of the variant, so a `CustomTitle` override
/// without its title cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "title", rename_all = "camelCase")]
pub enum OverrideAction {
    /// Suppress the term entirely for this article
    Disabled,
    /// Link the term, but to this title instead of the whitelist default
    CustomTitle(String),
}

/// A per-article link override, keyed by `(explanation_id, term_lower)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLinkOverride {
    pub id: u64,
    pub explanation_id: String,
    pub term: String,
    pub term_lower: String,
    pub action: OverrideAction,
}

/// A cached heading title for one article, unique per
/// `(explanation_id, heading_text_lower)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingLink {
    pub explanation_id: String,
    pub heading_text: String,
    pub heading_text_lower: String,
    pub standalone_title: String,
}

/// Whether a resolved link came from a heading or a whitelist term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Heading,
    Term,
}

/// One link produced by a resolution pass. Transient, never persisted.
///
/// For `Term` links `text` is the matched substring with its source
/// casing preserved; for `Heading` links it is the full heading line,
/// hash marks included. Spans in one result set never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub text: String,
    pub span: LinkSpan,
    pub standalone_title: String,
    pub kind: LinkKind,
}
