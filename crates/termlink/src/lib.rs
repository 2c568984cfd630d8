//! termlink library - inline glossary link resolution for articles
//!
//! This crate wires the pure algorithms from `termlink-core` to the
//! external collaborators (store, title generator) and exposes them
//! over HTTP. The library surface exists for testing and embedding.

pub mod engine;
pub mod error;
pub mod headings;
pub mod index;
pub mod overrides;
pub mod server;
pub mod store;

use std::sync::Arc;

use engine::LinkEngine;
use headings::{HeadingLinkService, TitleGenerator};
use index::WhitelistIndex;
use overrides::OverrideService;
use store::MemoryStore;

/// Assemble an engine over one shared in-memory store. Used by the
/// demo server and the integration tests.
pub fn memory_engine(generator: Arc<dyn TitleGenerator>) -> LinkEngine {
    let store = Arc::new(MemoryStore::new());
    let index = Arc::new(WhitelistIndex::new(store.clone()));
    let overrides = Arc::new(OverrideService::new(store.clone()));
    let headings = Arc::new(HeadingLinkService::new(store, generator));
    LinkEngine::new(index, overrides, headings)
}
