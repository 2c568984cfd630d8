//! Level-2/3 heading extraction from article markdown.
//!
//! A heading is a line matching `^(##|###)\s+(.+)$`. Level-1 headings
//! and level-4+ headings are not link targets and are ignored.

use crate::model::LinkSpan;

/// A heading found in article content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading text with the marker and surrounding whitespace stripped
    pub text: String,
    /// Span of the full heading line, hash marks included
    pub span: LinkSpan,
    /// 2 or 3
    pub level: u8,
}

/// Extract all level-2 and level-3 headings with their line spans.
pub fn extract_headings(content: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut offset = 0usize;

    for raw_line in content.split('\n') {
        // Keep spans aligned with the source under CRLF line endings
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        if let Some((level, rest)) = heading_marker(line) {
            let text = rest.trim();
            if !text.is_empty() {
                headings.push(Heading {
                    text: text.to_string(),
                    span: LinkSpan::new(offset, offset + line.len()),
                    level,
                });
            }
        }

        offset += raw_line.len() + 1;
    }

    headings
}

/// Split a line into its `##`/`###` marker level and the remainder.
///
/// Requires at least one whitespace character after the marker, so
/// `####` and `##no-space` do not match.
fn heading_marker(line: &str) -> Option<(u8, &str)> {
    let hashes = line.len() - line.trim_start_matches('#').len();
    if hashes != 2 && hashes != 3 {
        return None;
    }
    let rest = &line[hashes..];
    let first = rest.chars().next()?;
    if !first.is_whitespace() {
        return None;
    }
    Some((hashes as u8, rest))
}
