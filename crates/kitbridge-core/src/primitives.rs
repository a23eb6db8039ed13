//! # Engine Primitives
//!
//! Hardcoded runtime constants for the KitBridge engine.
//!
//! These primitives are compiled into the binary and are immutable at runtime.
//! `EngineConfig` may override the ones marked as defaults.

/// Default number of production records a `KitProducer` keeps.
///
/// Older records are evicted first (FIFO) once the cap is reached.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Minimum token length (in characters) kept by the tokenizer.
///
/// Tokens of length 2 or less are discarded.
pub const MIN_TOKEN_LENGTH: usize = 3;

/// Context key carrying the project path.
pub const CONTEXT_PROJECT_PATH: &str = "project_path";

/// Context key carrying the project display name.
pub const CONTEXT_PROJECT_NAME: &str = "project_name";

/// Context key carrying the file a lifecycle event refers to.
pub const CONTEXT_FILE_PATH: &str = "file_path";

/// Metadata key naming the trigger that produced an output.
pub const META_TRIGGER: &str = "trigger";

// =============================================================================
// EXPORT LIMITS
// =============================================================================

/// Maximum number of records accepted by a canonical import.
///
/// This prevents memory exhaustion from malicious or corrupted data.
pub const MAX_IMPORT_RECORD_COUNT: u64 = 1_000_000;

/// Maximum payload size accepted by a canonical import (256 MB).
pub const MAX_IMPORT_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;
