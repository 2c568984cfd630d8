//! Heading-title cache service.
//!
//! Titles are generated once when an article is saved and consumed at
//! every render. Generation is best-effort: any failure is logged and
//! an empty map is returned so a flaky generator never blocks saving.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use termlink_core::{HeadingLink, extract_headings};

use crate::error::Result;
use crate::store::HeadingLinkStore;

/// The external title-generation collaborator (an LLM call in
/// production). Must return exactly one title per heading, in order.
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    async fn generate_titles(
        &self,
        article_title: &str,
        heading_texts: &[String],
    ) -> eyre::Result<Vec<String>>;
}

pub struct HeadingLinkService {
    store: Arc<dyn HeadingLinkStore>,
    generator: Arc<dyn TitleGenerator>,
}

impl HeadingLinkService {
    pub fn new(store: Arc<dyn HeadingLinkStore>, generator: Arc<dyn TitleGenerator>) -> Self {
        Self { store, generator }
    }

    pub async fn list_for_article(&self, explanation_id: &str) -> Result<Vec<HeadingLink>> {
        Ok(self.store.list_heading_links(explanation_id).await?)
    }

    /// The lookup map the resolver consumes: lowercased heading text
    /// to standalone title.
    pub async fn title_map(&self, explanation_id: &str) -> Result<BTreeMap<String, String>> {
        let rows = self.store.list_heading_links(explanation_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.heading_text_lower, row.standalone_title))
            .collect())
    }

    /// Save generated titles for one article. Additive: headings
    /// absent from `titles` keep their cached rows; re-saved headings
    /// get their title replaced.
    pub async fn save_heading_links(
        &self,
        explanation_id: &str,
        titles: &BTreeMap<String, String>,
    ) -> Result<()> {
        if titles.is_empty() {
            return Ok(());
        }
        let records: Vec<HeadingLink> = titles
            .iter()
            .map(|(heading_text, standalone_title)| HeadingLink {
                explanation_id: explanation_id.to_string(),
                heading_text: heading_text.clone(),
                heading_text_lower: heading_text.to_lowercase(),
                standalone_title: standalone_title.clone(),
            })
            .collect();
        self.store
            .upsert_heading_links(explanation_id, records)
            .await?;
        Ok(())
    }

    /// Drop every cached heading for one article. Invoked by the
    /// caller when content changed enough to invalidate the cache;
    /// never inferred here.
    pub async fn delete_heading_links(&self, explanation_id: &str) -> Result<usize> {
        Ok(self.store.delete_heading_links(explanation_id).await?)
    }

    /// Generate standalone titles for every level-2/3 heading in
    /// `content`. Returns raw heading text to title. Never fails:
    /// malformed generator output or a generator error yields an
    /// empty map with a warning.
    pub async fn generate_standalone_titles(
        &self,
        content: &str,
        article_title: &str,
        requester_id: &str,
    ) -> BTreeMap<String, String> {
        let headings = extract_headings(content);
        if headings.is_empty() {
            return BTreeMap::new();
        }
        let heading_texts: Vec<String> = headings.into_iter().map(|h| h.text).collect();

        info!(
            requester_id,
            headings = heading_texts.len(),
            "generating standalone heading titles"
        );

        let titles = match self
            .generator
            .generate_titles(article_title, &heading_texts)
            .await
        {
            Ok(titles) => titles,
            Err(e) => {
                warn!(requester_id, error = %e, "title generation failed, skipping heading cache");
                return BTreeMap::new();
            }
        };

        if titles.len() != heading_texts.len() {
            warn!(
                requester_id,
                expected = heading_texts.len(),
                got = titles.len(),
                "title generation returned wrong count, skipping heading cache"
            );
            return BTreeMap::new();
        }

        heading_texts
            .into_iter()
            .zip(titles)
            .map(|(heading, title)| (heading, clean_title(&title)))
            .collect()
    }
}

/// Title generator that returns every heading text as its own title.
/// Stands in for the real LLM client in the demo server.
pub struct PassthroughTitleGenerator;

#[async_trait]
impl TitleGenerator for PassthroughTitleGenerator {
    async fn generate_titles(
        &self,
        _article_title: &str,
        heading_texts: &[String],
    ) -> eyre::Result<Vec<String>> {
        Ok(heading_texts.to_vec())
    }
}

/// Trim whitespace and strip one layer of wrapping quotes, which LLMs
/// like to add around short answers.
fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
