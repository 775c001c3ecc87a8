//! Importer graph for hot-module invalidation.
//!
//! Maps a normalized module path to the set of paths that import it. Edges
//! point from dependency to importer, so a change to a module looks up who has
//! to be invalidated in one step.
//!
//! # Invariants
//! - Keys are already in the resolver's canonical key space
//! - Insertion is commutative: concurrent writers need no ordering
//! - Edges are only ever added here; pruning belongs to the HMR consumer

use std::ops::DerefMut;

use dashmap::DashMap;
use rustc_hash::FxHashSet;

type ImporterSet = FxHashSet<String>;

/// Thread-safe dependency → importers mapping.
#[derive(Debug, Default)]
pub struct ImporterGraph {
    importers: DashMap<String, ImporterSet>,
}

impl ImporterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the importer set for `key`, creating an empty one if absent.
    ///
    /// The returned handle holds the shard lock; keep it short-lived.
    pub fn ensure_entry(&self, key: &str) -> impl DerefMut<Target = ImporterSet> + '_ {
        self.importers.entry(key.to_string()).or_default()
    }

    /// Record that `importer` imports `importee`.
    ///
    /// Returns `true` if the edge is new.
    pub fn add_importer(&self, importee: &str, importer: &str) -> bool {
        self.ensure_entry(importee).insert(importer.to_string())
    }

    /// Importers of `key`, sorted for stable iteration.
    pub fn importers_of(&self, key: &str) -> Vec<String> {
        let mut importers: Vec<_> = self
            .importers
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        importers.sort_unstable();
        importers
    }

    /// Check whether the edge `importee → importer` exists.
    pub fn has_edge(&self, importee: &str, importer: &str) -> bool {
        self.importers
            .get(importee)
            .is_some_and(|set| set.contains(importer))
    }

    /// Number of tracked dependencies.
    pub fn len(&self) -> usize {
        self.importers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }
}
