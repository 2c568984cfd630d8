//! Whitelist index service.
//!
//! Owns the versioned snapshot lifecycle: every term or alias mutation
//! synchronously rebuilds the snapshot from the full current table
//! contents and persists it with `version + 1`. Readers always get a
//! complete map, never a half-applied mutation.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use termlink_core::{TermAlias, WhitelistSnapshot, WhitelistTerm};

use crate::error::{EngineError, Result};
use crate::store::WhitelistStore;

/// Partial update for one whitelist term. Absent fields keep their
/// current value. `description` is doubly optional so a caller can
/// clear it: `Some(None)` resets the description, `None` keeps it.
#[derive(Debug, Default, Clone)]
pub struct TermUpdate {
    pub canonical_term: Option<String>,
    pub standalone_title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

pub struct WhitelistIndex {
    store: Arc<dyn WhitelistStore>,
}

impl WhitelistIndex {
    pub fn new(store: Arc<dyn WhitelistStore>) -> Self {
        Self { store }
    }

    /// The current snapshot, building and persisting one if absent.
    ///
    /// No staleness check against the underlying tables: staleness is
    /// bounded by "until next mutation", not by a TTL.
    pub async fn get_snapshot(&self) -> Result<WhitelistSnapshot> {
        if let Some(snapshot) = self.store.get_snapshot().await? {
            return Ok(snapshot);
        }
        self.rebuild().await
    }

    /// Create a whitelist term. Idempotent: an existing active term
    /// with the same lowercase form is returned instead of an error.
    pub async fn create_term(
        &self,
        canonical_term: &str,
        standalone_title: &str,
        description: Option<String>,
    ) -> Result<WhitelistTerm> {
        let canonical_term = canonical_term.trim();
        let standalone_title = standalone_title.trim();
        if canonical_term.is_empty() {
            return Err(EngineError::Validation("canonical term is empty".into()));
        }
        if standalone_title.is_empty() {
            return Err(EngineError::Validation("standalone title is empty".into()));
        }

        if let Some(existing) = self
            .store
            .find_active_term_by_lower(&canonical_term.to_lowercase())
            .await?
        {
            return Ok(existing);
        }

        let id = self.store.next_id().await?;
        let mut term = WhitelistTerm::new(id, canonical_term, standalone_title);
        term.description = description;
        let term = self.store.insert_term(term).await?;
        self.rebuild().await?;
        Ok(term)
    }

    /// Update a term, keeping `canonical_term_lower` in sync with the
    /// canonical form.
    pub async fn update_term(&self, id: u64, update: TermUpdate) -> Result<WhitelistTerm> {
        let mut term = self
            .store
            .get_term(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("whitelist term {}", id)))?;

        if let Some(canonical) = update.canonical_term {
            let canonical = canonical.trim().to_string();
            if canonical.is_empty() {
                return Err(EngineError::Validation("canonical term is empty".into()));
            }
            term.canonical_term_lower = canonical.to_lowercase();
            term.canonical_term = canonical;
        }
        if let Some(title) = update.standalone_title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(EngineError::Validation("standalone title is empty".into()));
            }
            term.standalone_title = title;
        }
        if let Some(description) = update.description {
            term.description = description;
        }
        if let Some(is_active) = update.is_active {
            term.is_active = is_active;
        }

        // Renames and reactivations must not leave two active rows
        // sharing one lowercase key
        if term.is_active
            && let Some(existing) = self
                .store
                .find_active_term_by_lower(&term.canonical_term_lower)
                .await?
            && existing.id != term.id
        {
            return Err(EngineError::Validation(format!(
                "an active term already exists for '{}'",
                term.canonical_term_lower
            )));
        }

        let term = self.store.update_term(term).await?;
        self.rebuild().await?;
        Ok(term)
    }

    /// Delete a term and cascade its aliases.
    pub async fn delete_term(&self, id: u64) -> Result<()> {
        if !self.store.delete_term(id).await? {
            return Err(EngineError::NotFound(format!("whitelist term {}", id)));
        }
        self.store.delete_aliases_for_term(id).await?;
        self.rebuild().await?;
        Ok(())
    }

    /// Add aliases to a term. Aliases the term already has are
    /// returned as-is; only genuinely new rows are inserted, and the
    /// snapshot is rebuilt only when a row was actually added.
    pub async fn add_aliases(&self, term_id: u64, alias_terms: &[String]) -> Result<Vec<TermAlias>> {
        let term = self
            .store
            .get_term(term_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("whitelist term {}", term_id)))?;

        let existing = self.store.list_aliases_for_terms(&[term.id]).await?;
        let mut result = Vec::new();
        let mut inserted = false;

        for raw in alias_terms {
            let alias_term = raw.trim();
            if alias_term.is_empty() {
                return Err(EngineError::Validation("alias term is empty".into()));
            }
            let lower = alias_term.to_lowercase();

            let known = existing
                .iter()
                .chain(result.iter())
                .find(|a| a.alias_term_lower == lower)
                .cloned();
            if let Some(row) = known {
                if !result.iter().any(|a| a.id == row.id) {
                    result.push(row);
                }
                continue;
            }

            let id = self.store.next_id().await?;
            let row = self
                .store
                .insert_alias(TermAlias::new(id, term.id, alias_term))
                .await?;
            result.push(row);
            inserted = true;
        }

        if inserted {
            self.rebuild().await?;
        }
        Ok(result)
    }

    /// Remove one alias. The parent term is unaffected.
    pub async fn remove_alias(&self, alias_id: u64) -> Result<()> {
        if !self.store.delete_alias(alias_id).await? {
            return Err(EngineError::NotFound(format!("alias {}", alias_id)));
        }
        self.rebuild().await?;
        Ok(())
    }

    /// Aliases owned by one term, sorted by id.
    pub async fn list_aliases_for_term(&self, term_id: u64) -> Result<Vec<TermAlias>> {
        let mut aliases = self.store.list_aliases_for_terms(&[term_id]).await?;
        aliases.sort_by_key(|a| a.id);
        Ok(aliases)
    }

    /// All terms with their aliases, for the admin listing.
    pub async fn list_terms(&self) -> Result<Vec<(WhitelistTerm, Vec<TermAlias>)>> {
        let mut terms = self.store.list_all_terms().await?;
        terms.sort_by_key(|t| t.id);
        let ids: Vec<u64> = terms.iter().map(|t| t.id).collect();
        let aliases = self.store.list_aliases_for_terms(&ids).await?;

        Ok(terms
            .into_iter()
            .map(|term| {
                let mut own: Vec<TermAlias> = aliases
                    .iter()
                    .filter(|a| a.whitelist_id == term.id)
                    .cloned()
                    .collect();
                own.sort_by_key(|a| a.id);
                (term, own)
            })
            .collect())
    }

    /// Full rebuild from the current active terms and their aliases,
    /// persisted with the next version number.
    async fn rebuild(&self) -> Result<WhitelistSnapshot> {
        let previous_version = self
            .store
            .get_snapshot()
            .await?
            .map(|s| s.version)
            .unwrap_or(0);

        let terms = self.store.list_active_terms().await?;
        let ids: Vec<u64> = terms.iter().map(|t| t.id).collect();
        let aliases = self.store.list_aliases_for_terms(&ids).await?;

        let snapshot =
            WhitelistSnapshot::build(previous_version + 1, now_ms(), &terms, &aliases);
        let snapshot = self.store.upsert_snapshot(snapshot).await?;
        info!(
            version = snapshot.version,
            entries = snapshot.len(),
            "rebuilt whitelist snapshot"
        );
        Ok(snapshot)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
