//! # kitbridge-core
//!
//! The orchestration engine for KitBridge.
//!
//! Kits are functional units that declare typed input and output ports.
//! This crate matches those contracts, wires compatible Kits together with
//! bridges, runs their production on lifecycle triggers and captures every
//! artifact into a searchable, exportable content store.
//!
//! ## Layout
//!
//! - `types`: contract model (`DataType`, `DataPort`, `KitDescriptor`, ...)
//! - `catalog`: built-in Kits and their production logic
//! - `registry`: known Kits and the bridges between them
//! - `bridge`: bridge execution, chains and pairs
//! - `producer`: per-project production with bounded history
//! - `orchestrator`: the `AutoBridge` attachment state machine
//! - `storage`: multi-index content store with full-text search
//! - `export`: flat and canonical dumps of the store
//! - `engine`: facade that builds and injects all of the above
//!
//! ## Constraints
//!
//! - In-process only: no network, no disk I/O
//! - BTreeMap everywhere: iteration order is deterministic
//! - Each service owns its own lock; no lock is held across services

// =============================================================================
// MODULES
// =============================================================================

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod export;
pub mod orchestrator;
pub mod primitives;
pub mod producer;
pub mod query;
pub mod registry;
pub mod storage;
mod sync;
pub mod tokenizer;
pub mod types;

// =============================================================================
// RE-EXPORTS: Contract Model
// =============================================================================

pub use types::{
    ContentId, DataPort, DataType, KitDescriptor, KitId, KitbridgeError, Metadata,
    ProductionContext, ProductionOutput, StoredContent, TriggerKind,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use bridge::{
    Bridge, BridgeChain, BridgeData, BridgeExecutor, BridgePair, ExecutionResult,
    ExecutionStats, PairResult,
};
pub use catalog::{CatalogKit, KitCatalog, Produced, ProductionFn, ProductionTable};
pub use config::EngineConfig;
pub use engine::{Activation, Engine};
pub use orchestrator::{AttachResult, AutoBridge, BridgeFlow, TriggerReport};
pub use producer::{KitProducer, ProductionRecord};
pub use query::ContentQuery;
pub use registry::Registry;
pub use storage::{ContentStorage, StorageStats};

// =============================================================================
// RE-EXPORTS: Export
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub use export::canonical_hash;
pub use export::{
    CanonicalHeader, MLExportRecord, canonical_checksum, export_canonical, import_canonical,
    verify_canonical,
};
