//! # Kit Producer
//!
//! Runs one Kit's production logic for one project.
//!
//! - Outputs depend only on (kit, trigger, context); only the timestamp varies
//! - Every call appends a record to a bounded history (FIFO eviction)
//! - Kits without production logic, or triggers the Kit does not accept,
//!   produce nothing; this is not an error

use crate::catalog::ProductionFn;
use crate::primitives::META_TRIGGER;
use crate::sync::lock;
use crate::{KitDescriptor, KitId, ProductionContext, ProductionOutput, TriggerKind};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the UNIX epoch (0 if the clock is before the epoch).
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One entry of a producer's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionRecord {
    pub trigger: TriggerKind,
    pub output_count: usize,
    pub timestamp: u64,
}

/// Produces outputs for a (Kit, project) pairing.
#[derive(Debug)]
pub struct KitProducer {
    descriptor: KitDescriptor,
    project_path: String,
    production: Option<ProductionFn>,
    capacity: usize,
    history: Mutex<VecDeque<ProductionRecord>>,
}

impl KitProducer {
    /// Create a producer for `descriptor` attached to `project_path`.
    #[must_use]
    pub fn new(
        descriptor: &KitDescriptor,
        project_path: impl Into<String>,
        production: Option<ProductionFn>,
        capacity: usize,
    ) -> Self {
        Self {
            descriptor: descriptor.clone(),
            project_path: project_path.into(),
            production,
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// The Kit this producer runs.
    #[must_use]
    pub fn kit_id(&self) -> &KitId {
        &self.descriptor.id
    }

    /// The descriptor the producer was created from.
    #[must_use]
    pub fn descriptor(&self) -> &KitDescriptor {
        &self.descriptor
    }

    /// The project this producer is attached to.
    #[must_use]
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// Produce outputs for `trigger`.
    pub fn produce(
        &self,
        trigger: TriggerKind,
        context: &ProductionContext,
    ) -> Vec<ProductionOutput> {
        let timestamp = now_millis();

        let produced = match self.production {
            Some(production) if self.descriptor.accepts(trigger) => production(trigger, context),
            _ => Vec::new(),
        };

        let outputs: Vec<ProductionOutput> = produced
            .into_iter()
            .map(|p| {
                let mut metadata = p.metadata;
                metadata.insert(META_TRIGGER.to_string(), trigger.name().to_string());
                ProductionOutput {
                    kit_id: self.descriptor.id.clone(),
                    output_type: p.output_type,
                    data_type: p.data_type,
                    content: p.content,
                    metadata,
                    timestamp,
                }
            })
            .collect();

        self.remember(ProductionRecord {
            trigger,
            output_count: outputs.len(),
            timestamp,
        });

        outputs
    }

    fn remember(&self, record: ProductionRecord) {
        if self.capacity == 0 {
            return;
        }
        let mut history = lock(&self.history);
        while history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(record);
    }

    /// Production history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ProductionRecord> {
        lock(&self.history).iter().cloned().collect()
    }

    /// Number of history entries currently kept.
    #[must_use]
    pub fn history_len(&self) -> usize {
        lock(&self.history).len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
