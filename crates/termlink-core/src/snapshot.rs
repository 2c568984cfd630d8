//! Versioned whitelist snapshot.
//!
//! The snapshot is an immutable value: `(version, entries)` persisted and
//! replaced wholesale on every whitelist/alias mutation. Readers always
//! see a complete, self-consistent map, never a half-applied mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{TermAlias, WhitelistTerm};

/// The value stored in the snapshot map. Many keys (the canonical form
/// plus every alias, all lowercased) map to equal entries, which is what
/// lets "ML" and "Machine Learning" share one standalone title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub canonical_term: String,
    pub standalone_title: String,
}

/// A full snapshot of the whitelist lookup map.
///
/// `version` strictly increases by 1 on every rebuild; `entries` is
/// always regenerated from the current active term and alias rows,
/// never patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistSnapshot {
    pub version: u64,
    /// Lowercased lookup key (canonical term or alias) -> entry
    pub entries: BTreeMap<String, WhitelistEntry>,
    /// Unix milliseconds of the rebuild that produced this snapshot
    pub updated_at_ms: u64,
}

impl WhitelistSnapshot {
    /// Regenerate the lookup map from the current rows.
    ///
    /// Only active terms contribute; aliases contribute only when their
    /// owning term is active. Key collisions resolve first-writer-wins:
    /// canonical keys are inserted before alias keys, and aliases are
    /// processed in `(whitelist_id, id)` order, so the outcome does not
    /// depend on row iteration order.
    pub fn build(
        version: u64,
        updated_at_ms: u64,
        terms: &[WhitelistTerm],
        aliases: &[TermAlias],
    ) -> Self {
        let mut entries: BTreeMap<String, WhitelistEntry> = BTreeMap::new();

        let mut active: Vec<&WhitelistTerm> = terms.iter().filter(|t| t.is_active).collect();
        active.sort_by_key(|t| t.id);

        for term in &active {
            if term.canonical_term_lower.is_empty() {
                continue;
            }
            entries
                .entry(term.canonical_term_lower.clone())
                .or_insert_with(|| WhitelistEntry {
                    canonical_term: term.canonical_term.clone(),
                    standalone_title: term.standalone_title.clone(),
                });
        }

        let mut sorted_aliases: Vec<&TermAlias> = aliases.iter().collect();
        sorted_aliases.sort_by_key(|a| (a.whitelist_id, a.id));

        for alias in sorted_aliases {
            if alias.alias_term_lower.is_empty() {
                continue;
            }
            let Some(parent) = active.iter().find(|t| t.id == alias.whitelist_id) else {
                continue;
            };
            entries
                .entry(alias.alias_term_lower.clone())
                .or_insert_with(|| WhitelistEntry {
                    canonical_term: parent.canonical_term.clone(),
                    standalone_title: parent.standalone_title.clone(),
                });
        }

        Self {
            version,
            entries,
            updated_at_ms,
        }
    }

    /// Look up a lowercased key.
    pub fn get(&self, key_lower: &str) -> Option<&WhitelistEntry> {
        self.entries.get(key_lower)
    }

    /// All lookup keys, longest first so that "deep learning" is tried
    /// before its substring "learning". Ties break lexicographically
    /// for a deterministic scan order.
    pub fn keys_longest_first(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_maps_canonical_and_aliases() {
        let terms = vec![WhitelistTerm::new(1, "Machine Learning", "Machine Learning")];
        let aliases = vec![TermAlias::new(1, 1, "ML")];

        let snapshot = WhitelistSnapshot::build(1, 0, &terms, &aliases);
        assert_eq!(snapshot.len(), 2);

        let canonical = snapshot.get("machine learning").unwrap();
        let alias = snapshot.get("ml").unwrap();
        assert_eq!(canonical, alias);
        assert_eq!(alias.standalone_title, "Machine Learning");
        assert_eq!(alias.canonical_term, "Machine Learning");
    }

    #[test]
    fn test_inactive_terms_excluded_with_their_aliases() {
        let mut term = WhitelistTerm::new(1, "Deprecated Term", "Old");
        term.is_active = false;
        let aliases = vec![TermAlias::new(1, 1, "dep")];

        let snapshot = WhitelistSnapshot::build(3, 0, &[term], &aliases);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_alias_of_inactive_parent_does_not_shadow() {
        let mut inactive = WhitelistTerm::new(1, "gradient", "Gradient (old)");
        inactive.is_active = false;
        let active = WhitelistTerm::new(2, "Gradient", "Gradient");
        // Alias owned by the inactive term collides with the active canonical key
        let aliases = vec![TermAlias::new(1, 1, "gradient")];

        let snapshot = WhitelistSnapshot::build(1, 0, &[inactive, active], &aliases);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("gradient").unwrap().standalone_title, "Gradient");
    }

    #[test]
    fn test_canonical_wins_over_colliding_alias() {
        let terms = vec![
            WhitelistTerm::new(1, "AI", "Artificial Intelligence"),
            WhitelistTerm::new(2, "Machine Learning", "Machine Learning"),
        ];
        // Alias on term 2 colliding with term 1's canonical key
        let aliases = vec![TermAlias::new(1, 2, "ai")];

        let snapshot = WhitelistSnapshot::build(1, 0, &terms, &aliases);
        assert_eq!(
            snapshot.get("ai").unwrap().standalone_title,
            "Artificial Intelligence"
        );
    }

    #[test]
    fn test_colliding_aliases_resolve_by_owner_order() {
        let terms = vec![
            WhitelistTerm::new(1, "Neural Network", "Neural Network"),
            WhitelistTerm::new(2, "Natural Numbers", "Natural Numbers"),
        ];
        let aliases = vec![
            TermAlias::new(5, 2, "nn"),
            TermAlias::new(3, 1, "nn"),
        ];

        let snapshot = WhitelistSnapshot::build(1, 0, &terms, &aliases);
        // (whitelist_id, id) order: term 1's alias is inserted first
        assert_eq!(snapshot.get("nn").unwrap().canonical_term, "Neural Network");
    }

    #[test]
    fn test_keys_longest_first() {
        let terms = vec![
            WhitelistTerm::new(1, "learning", "Learning"),
            WhitelistTerm::new(2, "deep learning", "Deep Learning"),
            WhitelistTerm::new(3, "machine learning", "Machine Learning"),
        ];
        let snapshot = WhitelistSnapshot::build(1, 0, &terms, &[]);

        let keys = snapshot.keys_longest_first();
        assert_eq!(keys, vec!["machine learning", "deep learning", "learning"]);
    }

    #[test]
    fn test_rebuild_is_full_regeneration() {
        let terms = vec![WhitelistTerm::new(1, "tensor", "Tensor")];
        let v1 = WhitelistSnapshot::build(1, 0, &terms, &[]);
        assert!(v1.get("tensor").is_some());

        // A rebuild from an empty row set drops every previous key
        let v2 = WhitelistSnapshot::build(2, 0, &[], &[]);
        assert_eq!(v2.version, 2);
        assert!(v2.is_empty());
    }
}
