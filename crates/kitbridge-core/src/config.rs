//! Engine configuration.

use crate::primitives::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};

/// Tunables for a freshly constructed engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether production is enabled when the engine starts.
    pub start_enabled: bool,
    /// Production history entries kept per producer.
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_enabled: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
