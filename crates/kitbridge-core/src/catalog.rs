//! # Kit Catalog
//!
//! Static seed descriptors and the production table.
//!
//! Every built-in Kit is a `CatalogKit` variant. Its descriptor and its
//! production function are selected by exhaustive `match`, so adding a Kit
//! without production logic does not compile.
//!
//! Production functions are pure: the same trigger and context always
//! produce the same artifacts.

use crate::primitives::{CONTEXT_FILE_PATH, CONTEXT_PROJECT_NAME, CONTEXT_PROJECT_PATH};
use crate::{DataPort, DataType, KitDescriptor, KitId, Metadata, ProductionContext, TriggerKind};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// PRODUCED ARTIFACTS
// =============================================================================

/// An artifact as returned by a production function, before the producer
/// stamps it with the Kit id and a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Produced {
    pub output_type: String,
    pub data_type: DataType,
    pub content: String,
    pub metadata: Metadata,
}

impl Produced {
    /// Create an artifact with no metadata.
    pub fn new(output_type: &str, data_type: DataType, content: String) -> Self {
        Self {
            output_type: output_type.to_string(),
            data_type,
            content,
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata entry (builder style).
    #[must_use]
    pub fn meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Signature of a Kit's production logic.
pub type ProductionFn = fn(TriggerKind, &ProductionContext) -> Vec<Produced>;

// =============================================================================
// CATALOG KITS
// =============================================================================

/// The built-in Kits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CatalogKit {
    ProjectScanner,
    CodeParser,
    DocGenerator,
    IntentEngine,
    TaskPlanner,
    AgentRunner,
    SearchIndexer,
}

impl CatalogKit {
    /// Every built-in Kit, in catalog order.
    pub const ALL: [CatalogKit; 7] = [
        CatalogKit::ProjectScanner,
        CatalogKit::CodeParser,
        CatalogKit::DocGenerator,
        CatalogKit::IntentEngine,
        CatalogKit::TaskPlanner,
        CatalogKit::AgentRunner,
        CatalogKit::SearchIndexer,
    ];

    /// Stable id string.
    #[must_use]
    pub const fn id_str(self) -> &'static str {
        match self {
            CatalogKit::ProjectScanner => "project-scanner",
            CatalogKit::CodeParser => "code-parser",
            CatalogKit::DocGenerator => "doc-generator",
            CatalogKit::IntentEngine => "intent-engine",
            CatalogKit::TaskPlanner => "task-planner",
            CatalogKit::AgentRunner => "agent-runner",
            CatalogKit::SearchIndexer => "search-indexer",
        }
    }

    /// Kit id.
    #[must_use]
    pub fn id(self) -> KitId {
        KitId::new(self.id_str())
    }

    /// Resolve a Kit id to a built-in Kit.
    #[must_use]
    pub fn from_id(id: &KitId) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id_str() == id.as_str())
    }

    /// The Kit's contract.
    #[must_use]
    pub fn descriptor(self) -> KitDescriptor {
        match self {
            CatalogKit::ProjectScanner => KitDescriptor::new(self.id(), "Project Scanner")
                .with_input(port("root", DataType::Path, "Project root to scan"))
                .with_output(port("files", DataType::File, "Files discovered"))
                .with_output(port("layout", DataType::Metadata, "Directory layout summary"))
                .with_output(port("entry", DataType::Path, "Paths worth parsing"))
                .with_trigger(TriggerKind::ProjectCreate)
                .with_trigger(TriggerKind::FileChange),
            CatalogKit::CodeParser => KitDescriptor::new(self.id(), "Code Parser")
                .with_input(port("path", DataType::Path, "Source file to parse"))
                .with_output(port("symbols", DataType::Json, "Symbol table"))
                .with_output(port("source", DataType::Code, "Normalized source"))
                .with_output(port("entities", DataType::Entity, "Named entities"))
                .with_trigger(TriggerKind::FileChange)
                .with_trigger(TriggerKind::FileSave),
            CatalogKit::DocGenerator => KitDescriptor::new(self.id(), "Documentation Generator")
                .with_input(port("code", DataType::Code, "Source to document"))
                .with_output(port("docs", DataType::Markdown, "Generated documentation"))
                .with_output(port("summary", DataType::Document, "Project summary"))
                .with_trigger(TriggerKind::ProjectCreate)
                .with_trigger(TriggerKind::FileSave),
            CatalogKit::IntentEngine => KitDescriptor::new(self.id(), "Intent Engine")
                .with_input(port("query", DataType::Query, "User query"))
                .with_input(port("text", DataType::Text, "Free text"))
                .with_output(port("intent", DataType::Intent, "Detected intent"))
                .with_output(port("suggestion", DataType::Suggestion, "Next-step suggestion"))
                .with_trigger(TriggerKind::FileChange),
            CatalogKit::TaskPlanner => KitDescriptor::new(self.id(), "Task Planner")
                .with_input(port("intent", DataType::Intent, "Intent to plan for"))
                .with_output(port("task", DataType::Task, "Planned tasks"))
                .with_output(port("workflow", DataType::Workflow, "Ordered workflow"))
                .with_trigger(TriggerKind::ProjectCreate),
            CatalogKit::AgentRunner => KitDescriptor::new(self.id(), "Agent Runner")
                .with_input(port("task", DataType::Task, "Task to execute"))
                .with_input(port("command", DataType::Command, "Direct command"))
                .with_output(port("action", DataType::Action, "Action taken"))
                .with_output(port("prediction", DataType::Prediction, "Predicted next step"))
                .with_trigger(TriggerKind::FileSave),
            CatalogKit::SearchIndexer => KitDescriptor::new(self.id(), "Search Indexer")
                .with_input(port("content", DataType::Any, "Anything worth indexing"))
                .with_output(port("results", DataType::SearchResult, "Index updates"))
                .with_trigger(TriggerKind::ProjectCreate)
                .with_trigger(TriggerKind::FileSave),
        }
    }

    /// The Kit's production logic.
    #[must_use]
    pub fn production(self) -> ProductionFn {
        match self {
            CatalogKit::ProjectScanner => produce_project_scanner,
            CatalogKit::CodeParser => produce_code_parser,
            CatalogKit::DocGenerator => produce_doc_generator,
            CatalogKit::IntentEngine => produce_intent_engine,
            CatalogKit::TaskPlanner => produce_task_planner,
            CatalogKit::AgentRunner => produce_agent_runner,
            CatalogKit::SearchIndexer => produce_search_indexer,
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Descriptors the orchestrator registers on first attach.
#[derive(Debug, Clone)]
pub struct KitCatalog {
    kits: BTreeMap<KitId, KitDescriptor>,
}

impl Default for KitCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl KitCatalog {
    /// The built-in seed descriptors, in catalog order.
    #[must_use]
    pub fn all() -> Vec<KitDescriptor> {
        CatalogKit::ALL.into_iter().map(CatalogKit::descriptor).collect()
    }

    /// Catalog of the built-in Kits.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty().with_kits(Self::all())
    }

    /// Catalog with no Kits.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kits: BTreeMap::new(),
        }
    }

    /// Add (or replace) a descriptor.
    #[must_use]
    pub fn with_kit(mut self, descriptor: KitDescriptor) -> Self {
        self.kits.insert(descriptor.id.clone(), descriptor);
        self
    }

    /// Add several descriptors.
    #[must_use]
    pub fn with_kits(self, descriptors: impl IntoIterator<Item = KitDescriptor>) -> Self {
        descriptors.into_iter().fold(self, Self::with_kit)
    }

    /// Look up a descriptor.
    #[must_use]
    pub fn get(&self, id: &KitId) -> Option<&KitDescriptor> {
        self.kits.get(id)
    }

    /// Ids of every catalogued Kit, in id order.
    #[must_use]
    pub fn ids(&self) -> Vec<KitId> {
        self.kits.keys().cloned().collect()
    }

    /// Number of catalogued Kits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kits.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kits.is_empty()
    }
}

// =============================================================================
// PRODUCTION TABLE
// =============================================================================

/// Production functions keyed by Kit id.
#[derive(Debug, Clone)]
pub struct ProductionTable {
    entries: BTreeMap<KitId, ProductionFn>,
}

impl Default for ProductionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ProductionTable {
    /// Table with every built-in Kit.
    #[must_use]
    pub fn standard() -> Self {
        let entries = CatalogKit::ALL
            .into_iter()
            .map(|kit| (kit.id(), kit.production()))
            .collect();
        Self { entries }
    }

    /// Table with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register production logic for a Kit id (builder style).
    #[must_use]
    pub fn with(mut self, kit: KitId, production: ProductionFn) -> Self {
        self.entries.insert(kit, production);
        self
    }

    /// Production logic for a Kit id, if any.
    #[must_use]
    pub fn get(&self, kit: &KitId) -> Option<ProductionFn> {
        self.entries.get(kit).copied()
    }
}

// =============================================================================
// PRODUCTION FUNCTIONS
// =============================================================================

fn port(name: &str, data_type: DataType, description: &str) -> DataPort {
    DataPort::new(name, data_type, description)
}

fn context_value<'a>(context: &'a ProductionContext, key: &str) -> &'a str {
    context.get(key).map(String::as_str).unwrap_or("")
}

fn project_name(context: &ProductionContext) -> &str {
    match context_value(context, CONTEXT_PROJECT_NAME) {
        "" => "project",
        name => name,
    }
}

fn language_of(file: &str) -> &'static str {
    match Path::new(file).extension().and_then(|e| e.to_str()) {
        Some("rs") => "rust",
        Some("py") => "python",
        Some("ts" | "tsx") => "typescript",
        Some("js" | "jsx") => "javascript",
        Some("go") => "go",
        Some("swift") => "swift",
        Some("md") => "markdown",
        Some("toml" | "json" | "yaml" | "yml") => "config",
        _ => "plain",
    }
}

fn produce_project_scanner(trigger: TriggerKind, context: &ProductionContext) -> Vec<Produced> {
    let name = project_name(context);
    let path = context_value(context, CONTEXT_PROJECT_PATH);
    let file = context_value(context, CONTEXT_FILE_PATH);

    match trigger {
        TriggerKind::Attach | TriggerKind::ProjectCreate => vec![
            Produced::new(
                "layout",
                DataType::Metadata,
                format!("Project {} scanned at {}", name, path),
            )
            .meta("scope", "project"),
        ],
        TriggerKind::FileChange if !file.is_empty() => vec![
            Produced::new(
                "file-index",
                DataType::File,
                format!("Changed file {} in {}", file, name),
            )
            .meta("file", file)
            .meta("language", language_of(file)),
        ],
        _ => Vec::new(),
    }
}

fn produce_code_parser(trigger: TriggerKind, context: &ProductionContext) -> Vec<Produced> {
    let name = project_name(context);
    let file = context_value(context, CONTEXT_FILE_PATH);

    match trigger {
        TriggerKind::Attach => vec![Produced::new(
            "parser-status",
            DataType::Metadata,
            format!("Code parser ready for {}", name),
        )],
        TriggerKind::FileChange | TriggerKind::FileSave if !file.is_empty() => {
            let language = language_of(file);
            vec![
                Produced::new(
                    "symbols",
                    DataType::Json,
                    format!("{{\"file\":\"{}\",\"language\":\"{}\"}}", file, language),
                )
                .meta("file", file)
                .meta("language", language),
                Produced::new(
                    "source",
                    DataType::Code,
                    format!("// {} ({})", file, language),
                )
                .meta("file", file)
                .meta("language", language),
                Produced::new(
                    "entities",
                    DataType::Entity,
                    format!("Parsed {} entities from {}", language, file),
                )
                .meta("file", file),
            ]
        }
        _ => Vec::new(),
    }
}

fn produce_doc_generator(trigger: TriggerKind, context: &ProductionContext) -> Vec<Produced> {
    let name = project_name(context);
    let file = context_value(context, CONTEXT_FILE_PATH);

    match trigger {
        TriggerKind::Attach | TriggerKind::ProjectCreate => vec![
            Produced::new(
                "readme",
                DataType::Markdown,
                format!("# {}\n\nDocumentation overview for project {}.", name, name),
            )
            .meta("format", "markdown")
            .meta("section", "overview"),
        ],
        TriggerKind::FileSave if !file.is_empty() => vec![
            Produced::new(
                "api-doc",
                DataType::Markdown,
                format!("## {}\n\nGenerated API documentation for {}.", file, file),
            )
            .meta("format", "markdown")
            .meta("file", file),
        ],
        _ => Vec::new(),
    }
}

fn produce_intent_engine(trigger: TriggerKind, context: &ProductionContext) -> Vec<Produced> {
    let name = project_name(context);
    let file = context_value(context, CONTEXT_FILE_PATH);

    match trigger {
        TriggerKind::Attach => vec![Produced::new(
            "suggestion",
            DataType::Suggestion,
            format!("Describe what you want to build in {}", name),
        )],
        TriggerKind::FileChange if !file.is_empty() => vec![
            Produced::new(
                "intent",
                DataType::Intent,
                format!("Editing intent detected for {}", file),
            )
            .meta("file", file),
            Produced::new(
                "suggestion",
                DataType::Suggestion,
                format!("Consider adding tests for {}", file),
            )
            .meta("file", file),
        ],
        _ => Vec::new(),
    }
}

fn produce_task_planner(trigger: TriggerKind, context: &ProductionContext) -> Vec<Produced> {
    let name = project_name(context);

    match trigger {
        TriggerKind::ProjectCreate => vec![
            Produced::new(
                "task-list",
                DataType::Task,
                format!("Set up build, tests and documentation for {}", name),
            ),
            Produced::new(
                "workflow",
                DataType::Workflow,
                format!("scan then parse then document then index {}", name),
            ),
        ],
        _ => Vec::new(),
    }
}

fn produce_agent_runner(trigger: TriggerKind, context: &ProductionContext) -> Vec<Produced> {
    let file = context_value(context, CONTEXT_FILE_PATH);

    match trigger {
        TriggerKind::FileSave if !file.is_empty() => vec![
            Produced::new(
                "action",
                DataType::Action,
                format!("Run checks after saving {}", file),
            )
            .meta("file", file),
            Produced::new(
                "prediction",
                DataType::Prediction,
                format!("Next edit likely near {}", file),
            )
            .meta("file", file),
        ],
        _ => Vec::new(),
    }
}

fn produce_search_indexer(trigger: TriggerKind, context: &ProductionContext) -> Vec<Produced> {
    let name = project_name(context);
    let file = context_value(context, CONTEXT_FILE_PATH);

    match trigger {
        TriggerKind::Attach | TriggerKind::ProjectCreate => vec![Produced::new(
            "index-status",
            DataType::SearchResult,
            format!("Search index initialised for {}", name),
        )],
        TriggerKind::FileSave if !file.is_empty() => vec![
            Produced::new(
                "index-update",
                DataType::SearchResult,
                format!("Reindexed {}", file),
            )
            .meta("file", file),
        ],
        _ => Vec::new(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn context(file: &str) -> ProductionContext {
        let mut ctx = ProductionContext::new();
        ctx.insert(CONTEXT_PROJECT_NAME.to_string(), "demo".to_string());
        ctx.insert(CONTEXT_PROJECT_PATH.to_string(), "/work/demo".to_string());
        if !file.is_empty() {
            ctx.insert(CONTEXT_FILE_PATH.to_string(), file.to_string());
        }
        ctx
    }

    #[test]
    fn every_catalog_descriptor_is_valid() {
        for descriptor in KitCatalog::all() {
            assert!(descriptor.validate().is_ok(), "{}", descriptor.id);
        }
    }

    #[test]
    fn catalog_ids_round_trip() {
        for kit in CatalogKit::ALL {
            assert_eq!(CatalogKit::from_id(&kit.id()), Some(kit));
        }
        assert_eq!(CatalogKit::from_id(&KitId::new("nope")), None);
    }

    #[test]
    fn standard_table_covers_catalog() {
        let table = ProductionTable::standard();
        for id in KitCatalog::standard().ids() {
            assert!(table.get(&id).is_some(), "{}", id);
        }
    }

    #[test]
    fn production_is_deterministic() {
        let f = CatalogKit::CodeParser.production();
        let a = f(TriggerKind::FileSave, &context("src/lib.rs"));
        let b = f(TriggerKind::FileSave, &context("src/lib.rs"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a[0].metadata.get("language").map(String::as_str), Some("rust"));
    }

    #[test]
    fn code_parser_emits_every_declared_output_on_save() {
        let descriptor = CatalogKit::CodeParser.descriptor();
        let produce = CatalogKit::CodeParser.production();
        let produced = produce(TriggerKind::FileSave, &context("src/lib.rs"));

        for port in &descriptor.outputs {
            assert!(
                produced
                    .iter()
                    .any(|p| p.output_type == port.name && p.data_type == port.data_type),
                "{}",
                port.name
            );
        }
    }

    #[test]
    fn file_triggers_without_file_produce_nothing() {
        let f = CatalogKit::DocGenerator.production();
        assert!(f(TriggerKind::FileSave, &context("")).is_empty());
    }

    #[test]
    fn missing_project_name_falls_back() {
        let f = CatalogKit::DocGenerator.production();
        let out = f(TriggerKind::ProjectCreate, &ProductionContext::new());
        assert!(out[0].content.starts_with("# project"));
    }
}
