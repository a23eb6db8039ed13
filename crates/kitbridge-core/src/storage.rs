//! # Content Storage
//!
//! Durable (process-lifetime) record of every production output.
//!
//! The store keeps one primary map plus four secondary indices:
//! - by project path
//! - by Kit id
//! - by output type
//! - by search token (content plus every metadata key and value)
//!
//! All five structures sit behind one lock owned by the store. Storing is
//! append-only; the only removal is the `delete_project` bulk utility.
//! There is no eviction: callers with long-running workloads are expected
//! to call `delete_project` themselves.

use crate::export::MLExportRecord;
use crate::sync::lock;
use crate::tokenizer::tokenize;
use crate::{ContentId, KitId, ProductionOutput, StoredContent};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Cardinalities of the store and its indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_content: usize,
    pub project_count: usize,
    pub kit_count: usize,
    pub type_count: usize,
    pub indexed_words: usize,
}

type Postings = BTreeSet<ContentId>;

#[derive(Debug, Default)]
struct ContentIndex {
    content: BTreeMap<ContentId, StoredContent>,
    by_project: BTreeMap<String, Postings>,
    by_kit: BTreeMap<KitId, Postings>,
    by_type: BTreeMap<String, Postings>,
    words: BTreeMap<String, Postings>,
    next_id: u64,
}

impl ContentIndex {
    fn tokens_of(output: &ProductionOutput) -> BTreeSet<String> {
        let mut tokens = tokenize(&output.content);
        for (key, value) in &output.metadata {
            tokens.extend(tokenize(key));
            tokens.extend(tokenize(value));
        }
        tokens
    }

    fn collect(&self, ids: Option<&Postings>) -> Vec<StoredContent> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.content.get(id).cloned())
            .collect()
    }

    fn unlink<K: Ord>(index: &mut BTreeMap<K, Postings>, key: &K, id: ContentId) {
        if let Some(postings) = index.get_mut(key) {
            postings.remove(&id);
            if postings.is_empty() {
                index.remove(key);
            }
        }
    }
}

/// The content store.
#[derive(Debug, Default)]
pub struct ContentStorage {
    index: Mutex<ContentIndex>,
}

impl ContentStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture an output for a project. Never fails.
    pub fn store(
        &self,
        output: ProductionOutput,
        project_path: &str,
        project_name: &str,
    ) -> StoredContent {
        let tokens = ContentIndex::tokens_of(&output);
        let mut index = lock(&self.index);

        let id = ContentId(index.next_id);
        index.next_id = index.next_id.saturating_add(1);

        index
            .by_project
            .entry(project_path.to_string())
            .or_default()
            .insert(id);
        index
            .by_kit
            .entry(output.kit_id.clone())
            .or_default()
            .insert(id);
        index
            .by_type
            .entry(output.output_type.clone())
            .or_default()
            .insert(id);
        for token in tokens {
            index.words.entry(token).or_default().insert(id);
        }

        let stored = StoredContent {
            id,
            project_path: project_path.to_string(),
            project_name: project_name.to_string(),
            output,
            indexed: true,
        };
        index.content.insert(id, stored.clone());
        stored
    }

    /// Full-text search with AND semantics.
    ///
    /// Every query token must be present in an item for it to match. A query
    /// with no usable tokens, or with any unknown token, returns nothing.
    pub fn search(&self, query: &str) -> Vec<StoredContent> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let index = lock(&self.index);
        let mut matches: Option<Postings> = None;
        for token in &tokens {
            let Some(postings) = index.words.get(token) else {
                return Vec::new();
            };
            matches = Some(match matches {
                None => postings.clone(),
                Some(current) => current.intersection(postings).copied().collect(),
            });
            if matches.as_ref().is_some_and(BTreeSet::is_empty) {
                return Vec::new();
            }
        }

        index.collect(matches.as_ref())
    }

    /// Content captured for a project.
    pub fn get_project_content(&self, project_path: &str) -> Vec<StoredContent> {
        let index = lock(&self.index);
        index.collect(index.by_project.get(project_path))
    }

    /// Content produced by a Kit.
    pub fn get_kit_content(&self, kit: &KitId) -> Vec<StoredContent> {
        let index = lock(&self.index);
        index.collect(index.by_kit.get(kit))
    }

    /// Content with a given output type.
    pub fn get_type_content(&self, output_type: &str) -> Vec<StoredContent> {
        let index = lock(&self.index);
        index.collect(index.by_type.get(output_type))
    }

    /// Look up one item.
    pub fn get(&self, id: ContentId) -> Option<StoredContent> {
        lock(&self.index).content.get(&id).cloned()
    }

    /// Every item, in id order.
    pub fn all(&self) -> Vec<StoredContent> {
        lock(&self.index).content.values().cloned().collect()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        lock(&self.index).content.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        lock(&self.index).content.is_empty()
    }

    /// Dump every item, 1:1, in id order. No filtering.
    pub fn export_for_ml(&self) -> Vec<MLExportRecord> {
        lock(&self.index)
            .content
            .values()
            .map(MLExportRecord::from)
            .collect()
    }

    /// Cardinalities of the store and each index.
    pub fn stats(&self) -> StorageStats {
        let index = lock(&self.index);
        StorageStats {
            total_content: index.content.len(),
            project_count: index.by_project.len(),
            kit_count: index.by_kit.len(),
            type_count: index.by_type.len(),
            indexed_words: index.words.len(),
        }
    }

    /// Bulk-delete everything captured for a project.
    ///
    /// Removes the items and prunes every index. Returns how many items
    /// were removed.
    pub fn delete_project(&self, project_path: &str) -> usize {
        let mut index = lock(&self.index);
        let Some(ids) = index.by_project.remove(project_path) else {
            return 0;
        };

        for id in &ids {
            let Some(stored) = index.content.remove(id) else {
                continue;
            };
            let tokens = ContentIndex::tokens_of(&stored.output);
            ContentIndex::unlink(&mut index.by_kit, &stored.output.kit_id, *id);
            ContentIndex::unlink(&mut index.by_type, &stored.output.output_type, *id);
            for token in &tokens {
                ContentIndex::unlink(&mut index.words, token, *id);
            }
        }

        tracing::info!(project = project_path, removed = ids.len(), "project content deleted");
        ids.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataType, Metadata};

    fn output(kit: &str, output_type: &str, content: &str) -> ProductionOutput {
        ProductionOutput {
            kit_id: KitId::new(kit),
            output_type: output_type.to_string(),
            data_type: DataType::Text,
            content: content.to_string(),
            metadata: Metadata::new(),
            timestamp: 0,
        }
    }

    #[test]
    fn store_assigns_sequential_ids() {
        let storage = ContentStorage::new();
        let a = storage.store(output("k", "t", "first"), "/p", "p");
        let b = storage.store(output("k", "t", "second"), "/p", "p");

        assert_eq!(a.id, ContentId(0));
        assert_eq!(b.id, ContentId(1));
        assert!(a.indexed);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn search_uses_and_semantics() {
        let storage = ContentStorage::new();
        let first = storage.store(output("k", "t", "alpha beta"), "/p", "p");
        storage.store(output("k", "t", "alpha gamma"), "/p", "p");

        let both = storage.search("alpha beta");
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, first.id);

        assert_eq!(storage.search("alpha").len(), 2);
        assert!(storage.search("zeta").is_empty());
        assert!(storage.search("alpha zeta").is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let storage = ContentStorage::new();
        storage.store(output("k", "t", "Generated README"), "/p", "p");
        assert_eq!(storage.search("readme GENERATED").len(), 1);
    }

    #[test]
    fn query_of_short_tokens_returns_nothing() {
        let storage = ContentStorage::new();
        storage.store(output("k", "t", "an ox is big"), "/p", "p");
        assert!(storage.search("an ox").is_empty());
    }

    #[test]
    fn metadata_keys_and_values_are_searchable() {
        let storage = ContentStorage::new();
        let mut o = output("k", "t", "body");
        o.metadata.insert("language".to_string(), "rust".to_string());
        storage.store(o, "/p", "p");

        assert_eq!(storage.search("language").len(), 1);
        assert_eq!(storage.search("rust body").len(), 1);
    }

    #[test]
    fn secondary_indices_are_maintained() {
        let storage = ContentStorage::new();
        storage.store(output("doc", "readme", "one"), "/a", "a");
        storage.store(output("doc", "api-doc", "two"), "/b", "b");
        storage.store(output("parser", "symbols", "three"), "/a", "a");

        assert_eq!(storage.get_project_content("/a").len(), 2);
        assert_eq!(storage.get_kit_content(&KitId::new("doc")).len(), 2);
        assert_eq!(storage.get_type_content("symbols").len(), 1);
        assert!(storage.get_project_content("/missing").is_empty());

        let stats = storage.stats();
        assert_eq!(stats.total_content, 3);
        assert_eq!(stats.project_count, 2);
        assert_eq!(stats.kit_count, 2);
        assert_eq!(stats.type_count, 3);
        assert_eq!(stats.indexed_words, 3);
    }

    #[test]
    fn export_is_one_to_one() {
        let storage = ContentStorage::new();
        storage.store(output("doc", "readme", "one"), "/a", "a");
        storage.store(output("doc", "readme", "two"), "/a", "a");

        let records = storage.export_for_ml();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].content, "two");
        assert_eq!(records[1].project_name, "a");
    }

    #[test]
    fn delete_project_prunes_indices() {
        let storage = ContentStorage::new();
        storage.store(output("doc", "readme", "shared alpha"), "/a", "a");
        storage.store(output("doc", "readme", "shared beta"), "/b", "b");

        assert_eq!(storage.delete_project("/a"), 1);
        assert_eq!(storage.delete_project("/a"), 0);

        assert_eq!(storage.search("shared").len(), 1);
        assert!(storage.search("alpha").is_empty());

        let stats = storage.stats();
        assert_eq!(stats.total_content, 1);
        assert_eq!(stats.project_count, 1);
        // "shared" and "beta" remain
        assert_eq!(stats.indexed_words, 2);
    }

    #[test]
    fn concurrent_stores_get_distinct_ids() {
        let storage = ContentStorage::new();
        std::thread::scope(|scope| {
            for t in 0..4 {
                let storage = &storage;
                scope.spawn(move || {
                    for i in 0..25 {
                        storage.store(output("k", "t", &format!("item {} {}", t, i)), "/p", "p");
                    }
                });
            }
        });

        assert_eq!(storage.len(), 100);
        assert_eq!(storage.get_project_content("/p").len(), 100);
    }
}
