//! Per-article override service.
//!
//! One override row per `(explanation_id, term_lower)`; saving again
//! replaces the action.

use std::collections::BTreeMap;
use std::sync::Arc;

use termlink_core::{ArticleLinkOverride, OverrideAction};

use crate::error::{EngineError, Result};
use crate::store::OverrideStore;

pub struct OverrideService {
    store: Arc<dyn OverrideStore>,
}

impl OverrideService {
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self { store }
    }

    pub async fn list_for_article(&self, explanation_id: &str) -> Result<Vec<ArticleLinkOverride>> {
        Ok(self.store.list_overrides_for_article(explanation_id).await?)
    }

    /// The override map the resolver consumes: lowercased term to
    /// action.
    pub async fn override_map(
        &self,
        explanation_id: &str,
    ) -> Result<BTreeMap<String, OverrideAction>> {
        let rows = self.store.list_overrides_for_article(explanation_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.term_lower, row.action))
            .collect())
    }

    /// Create or replace the override for `(explanation_id, term)`.
    pub async fn upsert(
        &self,
        explanation_id: &str,
        term: &str,
        action: OverrideAction,
    ) -> Result<ArticleLinkOverride> {
        let term = term.trim();
        if explanation_id.is_empty() {
            return Err(EngineError::Validation("explanation id is empty".into()));
        }
        if term.is_empty() {
            return Err(EngineError::Validation("override term is empty".into()));
        }
        if let OverrideAction::CustomTitle(title) = &action
            && title.trim().is_empty()
        {
            return Err(EngineError::Validation(
                "custom title override has an empty title".into(),
            ));
        }

        let id = self.store.next_id().await?;
        let row = ArticleLinkOverride {
            id,
            explanation_id: explanation_id.to_string(),
            term: term.to_string(),
            term_lower: term.to_lowercase(),
            action,
        };
        Ok(self.store.upsert_override(row).await?)
    }

    pub async fn delete(&self, explanation_id: &str, term: &str) -> Result<()> {
        let removed = self
            .store
            .delete_override(explanation_id, &term.trim().to_lowercase())
            .await?;
        if !removed {
            return Err(EngineError::NotFound(format!(
                "override for term '{}' on article {}",
                term, explanation_id
            )));
        }
        Ok(())
    }
}
