//! Store contracts for the external relational database, plus the
//! in-memory implementation used by tests and the demo server.
//!
//! The engine never reaches past these traits: persistence is keyed
//! CRUD with no query logic of its own.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use termlink_core::{ArticleLinkOverride, HeadingLink, TermAlias, WhitelistSnapshot, WhitelistTerm};

/// A failed call to the external store.
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for whitelist terms, aliases, and the snapshot row.
#[async_trait]
pub trait WhitelistStore: Send + Sync {
    async fn list_active_terms(&self) -> StoreResult<Vec<WhitelistTerm>>;
    async fn list_all_terms(&self) -> StoreResult<Vec<WhitelistTerm>>;
    async fn get_term(&self, id: u64) -> StoreResult<Option<WhitelistTerm>>;
    async fn find_active_term_by_lower(&self, lower: &str) -> StoreResult<Option<WhitelistTerm>>;
    async fn insert_term(&self, term: WhitelistTerm) -> StoreResult<WhitelistTerm>;
    async fn update_term(&self, term: WhitelistTerm) -> StoreResult<WhitelistTerm>;
    async fn delete_term(&self, id: u64) -> StoreResult<bool>;

    async fn list_aliases_for_terms(&self, ids: &[u64]) -> StoreResult<Vec<TermAlias>>;
    async fn insert_alias(&self, alias: TermAlias) -> StoreResult<TermAlias>;
    async fn delete_alias(&self, id: u64) -> StoreResult<bool>;
    async fn delete_aliases_for_term(&self, whitelist_id: u64) -> StoreResult<usize>;

    /// The singleton snapshot row, absent until first build.
    async fn get_snapshot(&self) -> StoreResult<Option<WhitelistSnapshot>>;
    async fn upsert_snapshot(&self, snapshot: WhitelistSnapshot) -> StoreResult<WhitelistSnapshot>;

    /// Allocate the next row id. Sequence semantics, like the real
    /// store's autoincrement column.
    async fn next_id(&self) -> StoreResult<u64>;
}

/// Persistence for per-article link overrides.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn list_overrides_for_article(
        &self,
        explanation_id: &str,
    ) -> StoreResult<Vec<ArticleLinkOverride>>;
    async fn upsert_override(&self, row: ArticleLinkOverride) -> StoreResult<ArticleLinkOverride>;
    async fn delete_override(&self, explanation_id: &str, term_lower: &str) -> StoreResult<bool>;
    async fn next_id(&self) -> StoreResult<u64>;
}

/// Persistence for the per-article heading-title cache.
#[async_trait]
pub trait HeadingLinkStore: Send + Sync {
    async fn list_heading_links(&self, explanation_id: &str) -> StoreResult<Vec<HeadingLink>>;
    async fn upsert_heading_links(
        &self,
        explanation_id: &str,
        records: Vec<HeadingLink>,
    ) -> StoreResult<()>;
    async fn delete_heading_links(&self, explanation_id: &str) -> StoreResult<usize>;
}

#[derive(Default)]
struct MemoryInner {
    terms: BTreeMap<u64, WhitelistTerm>,
    aliases: BTreeMap<u64, TermAlias>,
    snapshot: Option<WhitelistSnapshot>,
    // Keyed by (explanation_id, term_lower) / (explanation_id, heading_text_lower)
    overrides: BTreeMap<(String, String), ArticleLinkOverride>,
    headings: BTreeMap<(String, String), HeadingLink>,
    next_id: u64,
}

/// In-memory store implementing all three contracts. Used by the test
/// suite and the demo server; not intended for production data.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // Rows are plain values, still usable after a poisoning panic
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl WhitelistStore for MemoryStore {
    async fn list_active_terms(&self) -> StoreResult<Vec<WhitelistTerm>> {
        let inner = self.lock();
        Ok(inner.terms.values().filter(|t| t.is_active).cloned().collect())
    }

    async fn list_all_terms(&self) -> StoreResult<Vec<WhitelistTerm>> {
        Ok(self.lock().terms.values().cloned().collect())
    }

    async fn get_term(&self, id: u64) -> StoreResult<Option<WhitelistTerm>> {
        Ok(self.lock().terms.get(&id).cloned())
    }

    async fn find_active_term_by_lower(&self, lower: &str) -> StoreResult<Option<WhitelistTerm>> {
        let inner = self.lock();
        Ok(inner
            .terms
            .values()
            .find(|t| t.is_active && t.canonical_term_lower == lower)
            .cloned())
    }

    async fn insert_term(&self, term: WhitelistTerm) -> StoreResult<WhitelistTerm> {
        let mut inner = self.lock();
        inner.terms.insert(term.id, term.clone());
        Ok(term)
    }

    async fn update_term(&self, term: WhitelistTerm) -> StoreResult<WhitelistTerm> {
        let mut inner = self.lock();
        if !inner.terms.contains_key(&term.id) {
            return Err(StoreError(format!("no term row with id {}", term.id)));
        }
        inner.terms.insert(term.id, term.clone());
        Ok(term)
    }

    async fn delete_term(&self, id: u64) -> StoreResult<bool> {
        Ok(self.lock().terms.remove(&id).is_some())
    }

    async fn list_aliases_for_terms(&self, ids: &[u64]) -> StoreResult<Vec<TermAlias>> {
        let inner = self.lock();
        Ok(inner
            .aliases
            .values()
            .filter(|a| ids.contains(&a.whitelist_id))
            .cloned()
            .collect())
    }

    async fn insert_alias(&self, alias: TermAlias) -> StoreResult<TermAlias> {
        let mut inner = self.lock();
        inner.aliases.insert(alias.id, alias.clone());
        Ok(alias)
    }

    async fn delete_alias(&self, id: u64) -> StoreResult<bool> {
        Ok(self.lock().aliases.remove(&id).is_some())
    }

    async fn delete_aliases_for_term(&self, whitelist_id: u64) -> StoreResult<usize> {
        let mut inner = self.lock();
        let doomed: Vec<u64> = inner
            .aliases
            .values()
            .filter(|a| a.whitelist_id == whitelist_id)
            .map(|a| a.id)
            .collect();
        for id in &doomed {
            inner.aliases.remove(id);
        }
        Ok(doomed.len())
    }

    async fn get_snapshot(&self) -> StoreResult<Option<WhitelistSnapshot>> {
        Ok(self.lock().snapshot.clone())
    }

    async fn upsert_snapshot(&self, snapshot: WhitelistSnapshot) -> StoreResult<WhitelistSnapshot> {
        self.lock().snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }

    async fn next_id(&self) -> StoreResult<u64> {
        let mut inner = self.lock();
        inner.next_id += 1;
        Ok(inner.next_id)
    }
}

#[async_trait]
impl OverrideStore for MemoryStore {
    async fn list_overrides_for_article(
        &self,
        explanation_id: &str,
    ) -> StoreResult<Vec<ArticleLinkOverride>> {
        let inner = self.lock();
        Ok(inner
            .overrides
            .range((explanation_id.to_string(), String::new())..)
            .take_while(|((eid, _), _)| eid == explanation_id)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn upsert_override(&self, row: ArticleLinkOverride) -> StoreResult<ArticleLinkOverride> {
        let mut inner = self.lock();
        let key = (row.explanation_id.clone(), row.term_lower.clone());
        inner.overrides.insert(key, row.clone());
        Ok(row)
    }

    async fn delete_override(&self, explanation_id: &str, term_lower: &str) -> StoreResult<bool> {
        let key = (explanation_id.to_string(), term_lower.to_string());
        Ok(self.lock().overrides.remove(&key).is_some())
    }

    async fn next_id(&self) -> StoreResult<u64> {
        let mut inner = self.lock();
        inner.next_id += 1;
        Ok(inner.next_id)
    }
}

#[async_trait]
impl HeadingLinkStore for MemoryStore {
    async fn list_heading_links(&self, explanation_id: &str) -> StoreResult<Vec<HeadingLink>> {
        let inner = self.lock();
        Ok(inner
            .headings
            .range((explanation_id.to_string(), String::new())..)
            .take_while(|((eid, _), _)| eid == explanation_id)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn upsert_heading_links(
        &self,
        explanation_id: &str,
        records: Vec<HeadingLink>,
    ) -> StoreResult<()> {
        let mut inner = self.lock();
        for record in records {
            let key = (explanation_id.to_string(), record.heading_text_lower.clone());
            inner.headings.insert(key, record);
        }
        Ok(())
    }

    async fn delete_heading_links(&self, explanation_id: &str) -> StoreResult<usize> {
        let mut inner = self.lock();
        let doomed: Vec<(String, String)> = inner
            .headings
            .range((explanation_id.to_string(), String::new())..)
            .take_while(|((eid, _), _)| eid == explanation_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            inner.headings.remove(key);
        }
        Ok(doomed.len())
    }
}
