//! termlink-core - Inline glossary link resolution for article markdown
//!
//! This crate provides the building blocks for:
//! - Building a versioned snapshot of the whitelist (canonical terms + aliases)
//! - Extracting level-2/3 headings from article markdown
//! - Resolving which substrings of an article become inline links
//! - Rewriting article markdown with the resolved links applied
//!
//! Everything here is pure: no I/O, no async. Store access and the
//! title-generation collaborator live in the `termlink` service crate.
//!
//! # Resolving links
//!
//! ```
//! use std::collections::BTreeMap;
//! use termlink_core::{WhitelistSnapshot, WhitelistTerm, resolve_links, apply_links};
//!
//! let terms = vec![WhitelistTerm::new(1, "machine learning", "Machine Learning")];
//! let snapshot = WhitelistSnapshot::build(1, 0, &terms, &[]);
//!
//! let content = "An intro to machine learning.";
//! let links = resolve_links(content, &snapshot, &BTreeMap::new(), &BTreeMap::new());
//! assert_eq!(links.len(), 1);
//! assert_eq!(links[0].text, "machine learning");
//!
//! let rewritten = apply_links(content, &links);
//! assert!(rewritten.contains("[machine learning]("));
//! ```

mod headings;
mod model;
mod resolve;
mod rewrite;
mod snapshot;

pub use headings::{Heading, extract_headings};
pub use model::{
    ArticleLinkOverride, HeadingLink, LinkKind, LinkSpan, OverrideAction, ResolvedLink, TermAlias,
    WhitelistTerm,
};
pub use resolve::resolve_links;
pub use rewrite::{apply_links, standalone_route};
pub use snapshot::{WhitelistEntry, WhitelistSnapshot};
