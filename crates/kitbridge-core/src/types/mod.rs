//! # Core Type Definitions
//!
//! This module contains the contract model and shared records for the KitBridge engine:
//! - Identifiers (`KitId`, `ContentId`)
//! - The contract model (`DataType`, `DataPort`, `TriggerKind`, `KitDescriptor`)
//! - Production records (`ProductionOutput`, `StoredContent`)
//! - Error types (`KitbridgeError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they key a `BTreeMap`/`BTreeSet`
//! - Carry metadata as `BTreeMap` so iteration order is stable

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// String metadata attached to outputs and payloads.
pub type Metadata = BTreeMap<String, String>;

/// Context handed to a Kit when it produces (file path, project name, ...).
pub type ProductionContext = BTreeMap<String, String>;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Globally unique, stable identifier of a Kit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KitId(pub String);

impl KitId {
    /// Create a new Kit identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a stored content item.
///
/// Assigned sequentially by the content store, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentId(pub u64);

// =============================================================================
// DATA TYPE
// =============================================================================

/// The closed set of payload types a port can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Text,
    Markdown,
    Json,
    Code,
    Path,
    Query,
    Content,
    Document,
    Metadata,
    Intent,
    Entity,
    Command,
    Action,
    Suggestion,
    Workflow,
    Task,
    Agent,
    Prediction,
    SearchResult,
    File,
    Any,
}

impl DataType {
    /// Every data type, in declaration order.
    pub const ALL: [DataType; 21] = [
        DataType::Text,
        DataType::Markdown,
        DataType::Json,
        DataType::Code,
        DataType::Path,
        DataType::Query,
        DataType::Content,
        DataType::Document,
        DataType::Metadata,
        DataType::Intent,
        DataType::Entity,
        DataType::Command,
        DataType::Action,
        DataType::Suggestion,
        DataType::Workflow,
        DataType::Task,
        DataType::Agent,
        DataType::Prediction,
        DataType::SearchResult,
        DataType::File,
        DataType::Any,
    ];

    /// Compatibility rule of the contract model.
    ///
    /// `Any` is compatible with every type in both directions; otherwise
    /// only identical types are compatible. The relation is symmetric and
    /// reflexive but not transitive.
    #[must_use]
    pub fn is_compatible(self, other: DataType) -> bool {
        self == DataType::Any || other == DataType::Any || self == other
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Markdown => "markdown",
            DataType::Json => "json",
            DataType::Code => "code",
            DataType::Path => "path",
            DataType::Query => "query",
            DataType::Content => "content",
            DataType::Document => "document",
            DataType::Metadata => "metadata",
            DataType::Intent => "intent",
            DataType::Entity => "entity",
            DataType::Command => "command",
            DataType::Action => "action",
            DataType::Suggestion => "suggestion",
            DataType::Workflow => "workflow",
            DataType::Task => "task",
            DataType::Agent => "agent",
            DataType::Prediction => "prediction",
            DataType::SearchResult => "search_result",
            DataType::File => "file",
            DataType::Any => "any",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = KitbridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        // Accept both "search_result" and "searchresult"
        let compact = wanted.replace('_', "");
        DataType::ALL
            .into_iter()
            .find(|t| t.name() == wanted || t.name().replace('_', "") == compact)
            .ok_or_else(|| KitbridgeError::Config(format!("Unknown data type: {}", s)))
    }
}

// =============================================================================
// DATA PORT
// =============================================================================

/// A named, typed input or output slot on a Kit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataPort {
    /// Port name, unique per side of a Kit.
    pub name: String,
    /// Declared payload type.
    pub data_type: DataType,
    /// Human-readable description.
    pub description: String,
}

impl DataPort {
    /// Create a new port.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: description.into(),
        }
    }

    /// Whether this (source, output) port can feed `target` (an input port).
    #[must_use]
    pub fn connects_to(&self, target: &DataPort) -> bool {
        self.data_type.is_compatible(target.data_type)
    }
}

// =============================================================================
// TRIGGERS
// =============================================================================

/// A lifecycle event that causes a Kit to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Implicit production right after a Kit is attached to a project.
    Attach,
    ProjectCreate,
    FileChange,
    FileSave,
    /// Explicit request from a caller.
    Manual,
}

impl TriggerKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TriggerKind::Attach => "attach",
            TriggerKind::ProjectCreate => "project_create",
            TriggerKind::FileChange => "file_change",
            TriggerKind::FileSave => "file_save",
            TriggerKind::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// KIT DESCRIPTOR
// =============================================================================

/// A Kit's identity plus its declared contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitDescriptor {
    pub id: KitId,
    pub name: String,
    pub inputs: Vec<DataPort>,
    pub outputs: Vec<DataPort>,
    pub triggers: BTreeSet<TriggerKind>,
}

impl KitDescriptor {
    /// Create a descriptor with no ports and no triggers.
    #[must_use]
    pub fn new(id: impl Into<KitId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            triggers: BTreeSet::new(),
        }
    }

    /// Add an input port (builder style).
    #[must_use]
    pub fn with_input(mut self, port: DataPort) -> Self {
        self.inputs.push(port);
        self
    }

    /// Add an output port (builder style).
    #[must_use]
    pub fn with_output(mut self, port: DataPort) -> Self {
        self.outputs.push(port);
        self
    }

    /// Add a trigger (builder style).
    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerKind) -> Self {
        self.triggers.insert(trigger);
        self
    }

    /// Whether the Kit produces on this trigger.
    ///
    /// `Attach` is accepted by every Kit.
    #[must_use]
    pub fn accepts(&self, trigger: TriggerKind) -> bool {
        trigger == TriggerKind::Attach || self.triggers.contains(&trigger)
    }

    /// Validate the descriptor.
    ///
    /// A descriptor is valid if:
    /// - The id is non-empty
    /// - At least one port is declared
    /// - Port names are unique per side
    ///
    /// Returns `KitbridgeError::InvalidDescriptor` if validation fails.
    pub fn validate(&self) -> Result<(), KitbridgeError> {
        if self.id.as_str().trim().is_empty() {
            return Err(KitbridgeError::InvalidDescriptor {
                kit: self.id.clone(),
                reason: "empty kit id".to_string(),
            });
        }

        if self.inputs.is_empty() && self.outputs.is_empty() {
            return Err(KitbridgeError::InvalidDescriptor {
                kit: self.id.clone(),
                reason: "kit declares no ports".to_string(),
            });
        }

        for (side, ports) in [("input", &self.inputs), ("output", &self.outputs)] {
            let mut seen = BTreeSet::new();
            for port in ports {
                if !seen.insert(port.name.as_str()) {
                    return Err(KitbridgeError::InvalidDescriptor {
                        kit: self.id.clone(),
                        reason: format!("duplicate {} port '{}'", side, port.name),
                    });
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// PRODUCTION RECORDS
// =============================================================================

/// One typed artifact emitted by a Kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOutput {
    pub kit_id: KitId,
    /// Kit-specific label for the artifact ("readme", "symbols", ...).
    pub output_type: String,
    pub data_type: DataType,
    pub content: String,
    pub metadata: Metadata,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

/// A production output captured by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContent {
    pub id: ContentId,
    pub project_path: String,
    pub project_name: String,
    pub output: ProductionOutput,
    /// Set once the item has been added to the token index.
    pub indexed: bool,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the KitBridge system.
///
/// Absence and incompatibility are NOT errors: they are returned as
/// `Option`/empty collections and `success = false` respectively.
#[derive(Debug, Error)]
pub enum KitbridgeError {
    /// A Kit descriptor failed validation at registration time.
    #[error("Invalid descriptor for kit '{kit}': {reason}")]
    InvalidDescriptor { kit: KitId, reason: String },

    /// A configuration value could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
