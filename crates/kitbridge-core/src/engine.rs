//! # Engine Module
//!
//! The facade that constructs every service and hands out shared handles.
//!
//! There are no globals: each `Engine` owns its own Registry, executor,
//! content store and orchestrator. Two engines never share state.

use crate::bridge::BridgeExecutor;
use crate::catalog::{KitCatalog, ProductionTable};
use crate::config::EngineConfig;
use crate::export::MLExportRecord;
use crate::orchestrator::{AttachResult, AutoBridge};
use crate::query::ContentQuery;
use crate::registry::Registry;
use crate::storage::{ContentStorage, StorageStats};
use crate::{KitId, ProductionOutput, StoredContent};
use std::sync::Arc;

/// Result of activating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    /// One entry per Kit, in attach order.
    pub attached: Vec<AttachResult>,
    /// Outputs of the project creation event.
    pub created: Vec<ProductionOutput>,
}

impl Activation {
    /// Number of Kits that attached successfully.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.attached.iter().filter(|r| r.success).count()
    }
}

/// An engine instance.
#[derive(Debug)]
pub struct Engine {
    registry: Arc<Registry>,
    executor: Arc<BridgeExecutor>,
    storage: Arc<ContentStorage>,
    auto_bridge: Arc<AutoBridge>,
    catalog: KitCatalog,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine over the built-in catalog with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine over the built-in catalog.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_parts(KitCatalog::standard(), ProductionTable::standard(), config)
    }

    /// Engine over a custom catalog and production table.
    #[must_use]
    pub fn with_parts(catalog: KitCatalog, table: ProductionTable, config: EngineConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let executor = Arc::new(BridgeExecutor::new());
        let storage = Arc::new(ContentStorage::new());
        let auto_bridge = Arc::new(AutoBridge::new(
            Arc::clone(&registry),
            Arc::clone(&executor),
            Arc::clone(&storage),
            catalog.clone(),
            table,
            config,
        ));

        Self {
            registry,
            executor,
            storage,
            auto_bridge,
            catalog,
        }
    }

    // =========================================================================
    // SERVICES
    // =========================================================================

    /// The Kit registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The bridge executor.
    #[must_use]
    pub fn executor(&self) -> &Arc<BridgeExecutor> {
        &self.executor
    }

    /// The content store.
    #[must_use]
    pub fn storage(&self) -> &Arc<ContentStorage> {
        &self.storage
    }

    /// The orchestrator.
    #[must_use]
    pub fn auto_bridge(&self) -> &Arc<AutoBridge> {
        &self.auto_bridge
    }

    /// The catalog this engine registers Kits from.
    #[must_use]
    pub fn catalog(&self) -> &KitCatalog {
        &self.catalog
    }

    // =========================================================================
    // ACTIVATION
    // =========================================================================

    /// Attach every catalog Kit to a project, then fire project creation.
    pub fn activate(&self, project_path: &str) -> Activation {
        self.activate_kits(&self.catalog.ids(), project_path)
    }

    /// Attach the given Kits to a project, then fire project creation.
    pub fn activate_kits(&self, kits: &[KitId], project_path: &str) -> Activation {
        let attached = self.auto_bridge.attach_all(kits, project_path);
        let created = self.auto_bridge.on_project_create(project_path);

        let activation = Activation { attached, created };
        tracing::info!(
            project = project_path,
            kits = activation.attached_count(),
            outputs = activation.created.len(),
            "project activated"
        );
        activation
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    /// Full-text search (AND over tokens).
    pub fn search(&self, query: &str) -> Vec<StoredContent> {
        self.storage.search(query)
    }

    /// Store statistics.
    pub fn storage_stats(&self) -> StorageStats {
        self.storage.stats()
    }

    /// Content captured for a project.
    pub fn project_content(&self, project_path: &str) -> Vec<StoredContent> {
        self.storage.get_project_content(project_path)
    }

    /// Content produced by a Kit.
    pub fn kit_content(&self, kit: &KitId) -> Vec<StoredContent> {
        self.storage.get_kit_content(kit)
    }

    /// Content of one output type.
    pub fn type_content(&self, output_type: &str) -> Vec<StoredContent> {
        self.storage.get_type_content(output_type)
    }

    /// Flat dump of the whole store.
    pub fn export_for_ml(&self) -> Vec<MLExportRecord> {
        self.storage.export_for_ml()
    }

    /// Execute a typed query.
    pub fn query(&self, query: &ContentQuery) -> Vec<StoredContent> {
        match query {
            ContentQuery::Search(text) => self.storage.search(text),
            ContentQuery::Project(path) => self.storage.get_project_content(path),
            ContentQuery::Kit(kit) => self.storage.get_kit_content(kit),
            ContentQuery::OutputType(name) => self.storage.get_type_content(name),
            ContentQuery::All => self.storage.all(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogKit;

    #[test]
    fn activate_attaches_whole_catalog() {
        let engine = Engine::new();
        let activation = engine.activate("/work/demo");

        assert_eq!(activation.attached_count(), CatalogKit::ALL.len());
        assert_eq!(engine.registry().kit_count(), CatalogKit::ALL.len());
        assert!(!activation.created.is_empty());
        assert_eq!(
            engine.auto_bridge().attached_kits("/work/demo").len(),
            CatalogKit::ALL.len()
        );
    }

    #[test]
    fn engines_do_not_share_state() {
        let a = Engine::new();
        let b = Engine::new();
        a.activate("/p");
        assert!(b.storage().is_empty());
        assert_eq!(b.registry().kit_count(), 0);
    }

    #[test]
    fn query_dispatches_to_indices() {
        let engine = Engine::new();
        engine.activate_kits(&[CatalogKit::DocGenerator.id()], "/work/demo");

        // attach + project creation
        assert_eq!(engine.query(&ContentQuery::All).len(), 2);
        assert_eq!(engine.query(&ContentQuery::output_type("readme")).len(), 2);
        assert_eq!(
            engine.query(&ContentQuery::kit(CatalogKit::DocGenerator.id())).len(),
            2
        );
        assert_eq!(engine.query(&ContentQuery::project("/work/demo")).len(), 2);
        assert_eq!(engine.query(&ContentQuery::search("documentation overview")).len(), 2);
        assert!(engine.query(&ContentQuery::project("/elsewhere")).is_empty());
    }

    #[test]
    fn export_matches_store() {
        let engine = Engine::new();
        engine.activate("/p");
        assert_eq!(engine.export_for_ml().len(), engine.storage_stats().total_content);
    }
}
