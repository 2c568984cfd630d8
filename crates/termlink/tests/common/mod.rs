//! Common test utilities.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;

use termlink::engine::LinkEngine;
use termlink::headings::TitleGenerator;
use termlink::store::{StoreError, StoreResult, WhitelistStore};
use termlink_core::{TermAlias, WhitelistSnapshot, WhitelistTerm};

/// Generator that replays a canned list of titles.
pub struct CannedTitleGenerator {
    pub titles: Vec<String>,
}

impl CannedTitleGenerator {
    pub fn new(titles: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            titles: titles.iter().map(|t| t.to_string()).collect(),
        })
    }
}

#[async_trait]
impl TitleGenerator for CannedTitleGenerator {
    async fn generate_titles(
        &self,
        _article_title: &str,
        _heading_texts: &[String],
    ) -> eyre::Result<Vec<String>> {
        Ok(self.titles.clone())
    }
}

/// Generator that always fails, like a down LLM endpoint.
pub struct FailingTitleGenerator;

#[async_trait]
impl TitleGenerator for FailingTitleGenerator {
    async fn generate_titles(
        &self,
        _article_title: &str,
        _heading_texts: &[String],
    ) -> eyre::Result<Vec<String>> {
        eyre::bail!("generation backend unavailable")
    }
}

/// Engine over a fresh in-memory store with a canned generator.
pub fn test_engine(titles: &[&str]) -> LinkEngine {
    termlink::memory_engine(CannedTitleGenerator::new(titles))
}

/// Whitelist store whose every call fails, for degraded-path tests.
pub struct BrokenWhitelistStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError("database unreachable".to_string()))
}

#[async_trait]
impl WhitelistStore for BrokenWhitelistStore {
    async fn list_active_terms(&self) -> StoreResult<Vec<WhitelistTerm>> {
        down()
    }
    async fn list_all_terms(&self) -> StoreResult<Vec<WhitelistTerm>> {
        down()
    }
    async fn get_term(&self, _id: u64) -> StoreResult<Option<WhitelistTerm>> {
        down()
    }
    async fn find_active_term_by_lower(&self, _lower: &str) -> StoreResult<Option<WhitelistTerm>> {
        down()
    }
    async fn insert_term(&self, _term: WhitelistTerm) -> StoreResult<WhitelistTerm> {
        down()
    }
    async fn update_term(&self, _term: WhitelistTerm) -> StoreResult<WhitelistTerm> {
        down()
    }
    async fn delete_term(&self, _id: u64) -> StoreResult<bool> {
        down()
    }
    async fn list_aliases_for_terms(&self, _ids: &[u64]) -> StoreResult<Vec<TermAlias>> {
        down()
    }
    async fn insert_alias(&self, _alias: TermAlias) -> StoreResult<TermAlias> {
        down()
    }
    async fn delete_alias(&self, _id: u64) -> StoreResult<bool> {
        down()
    }
    async fn delete_aliases_for_term(&self, _whitelist_id: u64) -> StoreResult<usize> {
        down()
    }
    async fn get_snapshot(&self) -> StoreResult<Option<WhitelistSnapshot>> {
        down()
    }
    async fn upsert_snapshot(&self, _snapshot: WhitelistSnapshot) -> StoreResult<WhitelistSnapshot> {
        down()
    }
    async fn next_id(&self) -> StoreResult<u64> {
        down()
    }
}
