//! Link resolution over article content.
//!
//! A resolution pass is a pure function of the content, the whitelist
//! snapshot, the article's override map, and the article's cached
//! heading titles. Headings are processed first and always link; the
//! whitelist pass then scans only outside the heading ranges.

use std::collections::{BTreeMap, HashSet};

use crate::headings::extract_headings;
use crate::model::{LinkKind, LinkSpan, OverrideAction, ResolvedLink};
use crate::snapshot::WhitelistSnapshot;

/// Resolve every inline link for one article.
///
/// `overrides` and `heading_titles` are keyed by lowercased term /
/// heading text. The result is sorted ascending by span start and its
/// spans never overlap.
pub fn resolve_links(
    content: &str,
    snapshot: &WhitelistSnapshot,
    overrides: &BTreeMap<String, OverrideAction>,
    heading_titles: &BTreeMap<String, String>,
) -> Vec<ResolvedLink> {
    let mut links: Vec<ResolvedLink> = Vec::new();

    // Pass 1: headings. Cached titles only; a miss falls back to the
    // raw heading text so this path never fails and never generates.
    let headings = extract_headings(content);
    for heading in &headings {
        let title = heading_titles
            .get(&heading.text.to_lowercase())
            .cloned()
            .unwrap_or_else(|| heading.text.clone());
        links.push(ResolvedLink {
            text: content[heading.span.start..heading.span.end].to_string(),
            span: heading.span,
            standalone_title: title,
            kind: LinkKind::Heading,
        });
    }
    let heading_spans: Vec<LinkSpan> = headings.iter().map(|h| h.span).collect();

    // Pass 2: whitelist terms, longest key first so "deep learning"
    // consumes its position before "learning" gets a turn.
    let mut matched_keys: HashSet<&str> = HashSet::new();
    for key in snapshot.keys_longest_first() {
        if matched_keys.contains(key) {
            continue;
        }

        if let Some(OverrideAction::Disabled) = overrides.get(key) {
            // Mark it consumed so the term can never surface this pass
            matched_keys.insert(key);
            continue;
        }

        let Some(span) = find_occurrence(content, key, &heading_spans, &links) else {
            continue;
        };

        let standalone_title = match overrides.get(key) {
            Some(OverrideAction::CustomTitle(title)) => title.clone(),
            _ => match snapshot.get(key) {
                Some(entry) => entry.standalone_title.clone(),
                None => continue,
            },
        };

        links.push(ResolvedLink {
            text: content[span.start..span.end].to_string(),
            span,
            standalone_title,
            kind: LinkKind::Term,
        });
        matched_keys.insert(key);
    }

    links.sort_by_key(|l| l.span.start);
    links
}

/// First occurrence of `key` that sits outside every heading range,
/// passes the word-boundary check on both edges, and does not overlap
/// any link accepted so far.
fn find_occurrence(
    content: &str,
    key: &str,
    heading_spans: &[LinkSpan],
    accepted: &[ResolvedLink],
) -> Option<LinkSpan> {
    let mut from = 0usize;
    while let Some(span) = find_case_insensitive(content, key, from) {
        let inside_heading = heading_spans.iter().any(|h| span.overlaps(h));
        let overlaps_accepted = accepted.iter().any(|l| span.overlaps(&l.span));

        if !inside_heading && !overlaps_accepted && has_word_boundaries(content, span) {
            return Some(span);
        }

        // Advance past this candidate's first character
        from = span.start + content[span.start..].chars().next().map_or(1, char::len_utf8);
        if from >= content.len() {
            break;
        }
    }
    None
}

/// Whether the characters adjacent to `span` are boundaries.
///
/// A boundary is the start/end of the content or a whitespace or
/// punctuation character. A hyphen is explicitly *not* a boundary, so
/// "deep-learning" does not match the free-standing term "learning".
fn has_word_boundaries(content: &str, span: LinkSpan) -> bool {
    let before_ok = content[..span.start]
        .chars()
        .next_back()
        .is_none_or(is_boundary_char);
    let after_ok = content[span.end..].chars().next().is_none_or(is_boundary_char);
    before_ok && after_ok
}

fn is_boundary_char(c: char) -> bool {
    !c.is_alphanumeric() && c != '-'
}

/// Case-insensitive search for `needle_lower` (already lowercased) in
/// `content`, starting at byte offset `from`. Returns the byte span of
/// the matched source text, which may differ in length from the needle
/// when lowercasing changes a character's width.
fn find_case_insensitive(content: &str, needle_lower: &str, from: usize) -> Option<LinkSpan> {
    if needle_lower.is_empty() || from > content.len() {
        return None;
    }
    for (i, _) in content[from..].char_indices() {
        let at = from + i;
        if let Some(end) = match_at(content, at, needle_lower) {
            return Some(LinkSpan::new(at, end));
        }
    }
    None
}

/// Try to match the needle at one position; returns the end offset of
/// the matched source text on success.
fn match_at(content: &str, at: usize, needle_lower: &str) -> Option<usize> {
    let mut needle = needle_lower.chars();
    let mut pending = needle.next();
    let mut consumed = 0usize;

    for c in content[at..].chars() {
        for lc in c.to_lowercase() {
            match pending {
                Some(n) if n == lc => pending = needle.next(),
                // Mismatch, or a multi-char lowercase expansion spilling
                // past the end of the needle
                _ => return None,
            }
        }
        consumed += c.len_utf8();
        if pending.is_none() {
            return Some(at + consumed);
        }
    }
    None
}
