//! API types for the termlink server
//!
//! This crate contains only the JSON API type definitions used by the
//! termlink HTTP server and the admin dashboard that consumes it.

use serde::{Deserialize, Serialize};
use termlink_core::{
    ArticleLinkOverride, HeadingLink, LinkKind, OverrideAction, ResolvedLink, TermAlias,
    WhitelistSnapshot, WhitelistTerm,
};

/// Snapshot cache state, for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSnapshotInfo {
    pub version: u64,
    pub entry_count: usize,
    pub updated_at_ms: u64,
}

impl From<&WhitelistSnapshot> for ApiSnapshotInfo {
    fn from(snapshot: &WhitelistSnapshot) -> Self {
        Self {
            version: snapshot.version,
            entry_count: snapshot.len(),
            updated_at_ms: snapshot.updated_at_ms,
        }
    }
}

/// One whitelist term with its aliases, as listed to the admin UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTerm {
    pub id: u64,
    pub canonical_term: String,
    pub standalone_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub aliases: Vec<ApiAlias>,
}

impl ApiTerm {
    pub fn from_rows(term: &WhitelistTerm, aliases: &[TermAlias]) -> Self {
        Self {
            id: term.id,
            canonical_term: term.canonical_term.clone(),
            standalone_title: term.standalone_title.clone(),
            description: term.description.clone(),
            is_active: term.is_active,
            aliases: aliases.iter().map(ApiAlias::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAlias {
    pub id: u64,
    pub whitelist_id: u64,
    pub alias_term: String,
}

impl From<&TermAlias> for ApiAlias {
    fn from(alias: &TermAlias) -> Self {
        Self {
            id: alias.id,
            whitelist_id: alias.whitelist_id,
            alias_term: alias.alias_term.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTermRequest {
    pub canonical_term: String,
    pub standalone_title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTermRequest {
    #[serde(default)]
    pub canonical_term: Option<String>,
    #[serde(default)]
    pub standalone_title: Option<String>,
    /// Absent keeps the current description; an explicit `null`
    /// clears it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Maps a present-but-null JSON field to `Some(None)`, leaving the
/// outer `None` for fields that are absent entirely.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddAliasesRequest {
    pub aliases: Vec<String>,
}

/// Per-article override as exchanged with the admin UI. The action is
/// the same tagged form the core model serializes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverride {
    pub id: u64,
    pub explanation_id: String,
    pub term: String,
    pub action: OverrideAction,
}

impl From<&ArticleLinkOverride> for ApiOverride {
    fn from(row: &ArticleLinkOverride) -> Self {
        Self {
            id: row.id,
            explanation_id: row.explanation_id.clone(),
            term: row.term.clone(),
            action: row.action.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOverrideRequest {
    pub term: String,
    pub action: OverrideAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHeadingLink {
    pub heading_text: String,
    pub standalone_title: String,
}

impl From<&HeadingLink> for ApiHeadingLink {
    fn from(row: &HeadingLink) -> Self {
        Self {
            heading_text: row.heading_text.clone(),
            standalone_title: row.standalone_title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTitlesRequest {
    pub content: String,
    pub article_title: String,
    #[serde(default)]
    pub requester_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResolvedLink {
    pub term: String,
    pub start_index: usize,
    pub end_index: usize,
    pub standalone_title: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
}

impl From<&ResolvedLink> for ApiResolvedLink {
    fn from(link: &ResolvedLink) -> Self {
        Self {
            term: link.text.clone(),
            start_index: link.span.start,
            end_index: link.span.end,
            standalone_title: link.standalone_title.clone(),
            kind: link.kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub links: Vec<ApiResolvedLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    pub content: String,
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
