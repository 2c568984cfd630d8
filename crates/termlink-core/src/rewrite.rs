//! Content rewriting.
//!
//! Takes the resolved links for an article and splices markdown link
//! syntax into the content. Every byte outside the resolved spans is
//! carried through unchanged.

use crate::model::{LinkKind, ResolvedLink};

/// The standalone page route for a resolved title.
pub fn standalone_route(title: &str) -> String {
    format!("/standalone?title={}", urlencoding::encode(title))
}

/// Splice `links` into `content` as markdown links.
///
/// Links are applied in descending span order so earlier offsets stay
/// valid while later spans are rewritten. Spans are assumed sorted and
/// non-overlapping, as produced by [`resolve_links`].
///
/// [`resolve_links`]: crate::resolve_links
pub fn apply_links(content: &str, links: &[ResolvedLink]) -> String {
    let mut out = content.to_string();
    let mut ordered: Vec<&ResolvedLink> = links.iter().collect();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    for link in ordered {
        let replacement = match link.kind {
            LinkKind::Term => markdown_link(&link.text, &link.standalone_title),
            LinkKind::Heading => heading_replacement(link),
        };
        out.replace_range(link.span.start..link.span.end, &replacement);
    }
    out
}

fn markdown_link(text: &str, title: &str) -> String {
    format!("[{}]({})", text, standalone_route(title))
}

/// Re-emit a heading line with only its text wrapped. The span text
/// carries the marker, so split it back into marker, interior
/// whitespace, and the heading text proper.
fn heading_replacement(link: &ResolvedLink) -> String {
    let marker_len = link.text.len() - link.text.trim_start_matches('#').len();
    let after_marker = &link.text[marker_len..];
    let text_start = marker_len + (after_marker.len() - after_marker.trim_start().len());

    let prefix = &link.text[..text_start];
    let text = link.text[text_start..].trim_end();
    let trailing = &link.text[text_start + text.len()..];

    format!(
        "{}{}{}",
        prefix,
        markdown_link(text, &link.standalone_title),
        trailing
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::WhitelistTerm;
    use crate::resolve::resolve_links;
    use crate::snapshot::WhitelistSnapshot;

    fn resolve_and_apply(content: &str, terms: &[(&str, &str)]) -> String {
        let rows: Vec<WhitelistTerm> = terms
            .iter()
            .enumerate()
            .map(|(i, (term, title))| WhitelistTerm::new(i as u64 + 1, *term, *title))
            .collect();
        let snapshot = WhitelistSnapshot::build(1, 0, &rows, &[]);
        let links = resolve_links(content, &snapshot, &BTreeMap::new(), &BTreeMap::new());
        apply_links(content, &links)
    }

    #[test]
    fn test_standalone_route_encodes_title() {
        assert_eq!(
            standalone_route("Machine Learning"),
            "/standalone?title=Machine%20Learning"
        );
        assert_eq!(standalone_route("C++ & Rust"), "/standalone?title=C%2B%2B%20%26%20Rust");
    }

    #[test]
    fn test_term_wrapped_in_markdown_link() {
        let out = resolve_and_apply(
            "An intro to machine learning.",
            &[("machine learning", "Machine Learning")],
        );
        assert_eq!(
            out,
            "An intro to [machine learning](/standalone?title=Machine%20Learning)."
        );
    }

    #[test]
    fn test_heading_keeps_marker_outside_link() {
        let out = resolve_and_apply("## Gradient Descent\n\nBody text.", &[]);
        assert_eq!(
            out,
            "## [Gradient Descent](/standalone?title=Gradient%20Descent)\n\nBody text."
        );
    }

    #[test]
    fn test_multiple_links_applied_without_offset_drift() {
        let out = resolve_and_apply(
            "## Intro\n\ntensor math and gradient descent",
            &[("tensor", "Tensor"), ("gradient", "Gradient")],
        );
        assert_eq!(
            out,
            "## [Intro](/standalone?title=Intro)\n\n\
             [tensor](/standalone?title=Tensor) math and \
             [gradient](/standalone?title=Gradient) descent"
        );
    }

    #[test]
    fn test_no_links_returns_content_unchanged() {
        let content = "Nothing to link here.";
        assert_eq!(apply_links(content, &[]), content);
    }

    #[test]
    fn test_bytes_outside_spans_untouched() {
        let content = "before    tensor    after \t end";
        let out = resolve_and_apply(content, &[("tensor", "Tensor")]);
        let stripped = out.replace("[tensor](/standalone?title=Tensor)", "tensor");
        assert_eq!(stripped, content);
    }

    #[test]
    fn test_unicode_body_survives_rewrite() {
        let content = "Ein schönes Beispiel für tensor Algebra.";
        let out = resolve_and_apply(content, &[("tensor", "Tensor")]);
        assert_eq!(
            out,
            "Ein schönes Beispiel für [tensor](/standalone?title=Tensor) Algebra."
        );
    }
}
