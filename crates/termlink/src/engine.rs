//! The link engine: resolution and rendering over the services.

use std::sync::Arc;

use tracing::warn;

use termlink_core::{ResolvedLink, apply_links, resolve_links};

use crate::error::Result;
use crate::headings::HeadingLinkService;
use crate::index::WhitelistIndex;
use crate::overrides::OverrideService;

pub struct LinkEngine {
    pub index: Arc<WhitelistIndex>,
    pub overrides: Arc<OverrideService>,
    pub headings: Arc<HeadingLinkService>,
}

impl LinkEngine {
    pub fn new(
        index: Arc<WhitelistIndex>,
        overrides: Arc<OverrideService>,
        headings: Arc<HeadingLinkService>,
    ) -> Self {
        Self {
            index,
            overrides,
            headings,
        }
    }

    /// Resolve every inline link for one article. A store failure
    /// aborts resolution: no partial link list is ever returned.
    pub async fn resolve_links_for_article(
        &self,
        explanation_id: &str,
        content: &str,
    ) -> Result<Vec<ResolvedLink>> {
        let snapshot = self.index.get_snapshot().await?;
        let overrides = self.overrides.override_map(explanation_id).await?;
        let heading_titles = self.headings.title_map(explanation_id).await?;

        Ok(resolve_links(content, &snapshot, &overrides, &heading_titles))
    }

    /// Render an article with its links applied. The link overlay is
    /// an enhancement, so any resolution failure degrades to the
    /// original content instead of failing the page.
    pub async fn render_article(&self, explanation_id: &str, content: &str) -> String {
        match self.resolve_links_for_article(explanation_id, content).await {
            Ok(links) => apply_links(content, &links),
            Err(e) => {
                warn!(explanation_id, error = %e, "link resolution failed, rendering without links");
                content.to_string()
            }
        }
    }
}
