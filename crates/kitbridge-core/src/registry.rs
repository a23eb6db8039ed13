//! # Registry
//!
//! Holds every known `KitDescriptor` and the bridges created between them.
//!
//! - Descriptors are validated before they are stored
//! - Bridge creation scans output × input ports in declaration order;
//!   the first connectable pair wins (no scoring)
//! - A logically identical bridge is never stored twice
//!
//! All state sits behind a single lock owned by the Registry, so two
//! concurrent `create_bridge` calls cannot double-register a bridge.

use crate::bridge::Bridge;
use crate::sync::lock;
use crate::{KitDescriptor, KitId, KitbridgeError};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct RegistryState {
    kits: BTreeMap<KitId, KitDescriptor>,
    /// Bridges in creation order.
    bridges: Vec<Bridge>,
}

impl RegistryState {
    fn first_connectable(&self, from: &KitId, to: &KitId) -> Option<Bridge> {
        let source = self.kits.get(from)?;
        let target = self.kits.get(to)?;

        source.outputs.iter().find_map(|out| {
            target
                .inputs
                .iter()
                .find(|input| out.connects_to(input))
                .map(|input| Bridge {
                    source_kit: source.id.clone(),
                    target_kit: target.id.clone(),
                    source_port: out.clone(),
                    target_port: input.clone(),
                })
        })
    }

    fn is_bridged(&self, from: &KitId, to: &KitId) -> bool {
        self.bridges
            .iter()
            .any(|b| &b.source_kit == from && &b.target_kit == to)
    }
}

/// The Kit registry.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a descriptor, keyed by its id.
    ///
    /// Returns `KitbridgeError::InvalidDescriptor` and leaves the registry
    /// untouched if the descriptor fails validation.
    pub fn register(&self, descriptor: KitDescriptor) -> Result<(), KitbridgeError> {
        descriptor.validate()?;
        let id = descriptor.id.clone();
        let replaced = lock(&self.state).kits.insert(id.clone(), descriptor).is_some();
        tracing::debug!(kit = %id, replaced, "kit registered");
        Ok(())
    }

    /// Look up a descriptor by id.
    pub fn get_kit(&self, id: &KitId) -> Option<KitDescriptor> {
        lock(&self.state).kits.get(id).cloned()
    }

    /// Whether a Kit is registered.
    pub fn contains(&self, id: &KitId) -> bool {
        lock(&self.state).kits.contains_key(id)
    }

    /// Number of registered Kits.
    pub fn kit_count(&self) -> usize {
        lock(&self.state).kits.len()
    }

    /// All registered descriptors, in id order.
    pub fn kits(&self) -> Vec<KitDescriptor> {
        lock(&self.state).kits.values().cloned().collect()
    }

    /// Create a bridge from `from`'s outputs to `to`'s inputs.
    ///
    /// Returns `None` if either Kit is unknown or no port pair connects.
    /// If the chosen bridge already exists, the stored one is returned and
    /// nothing new is recorded.
    pub fn create_bridge(&self, from: &KitId, to: &KitId) -> Option<Bridge> {
        let mut state = lock(&self.state);
        let bridge = state.first_connectable(from, to)?;

        if !state.bridges.contains(&bridge) {
            tracing::debug!(
                source = %bridge.source_kit,
                source_port = %bridge.source_port.name,
                target = %bridge.target_kit,
                target_port = %bridge.target_port.name,
                "bridge created"
            );
            state.bridges.push(bridge.clone());
        }
        Some(bridge)
    }

    /// Bridges where the Kit is the source or the target.
    pub fn bridges_for(&self, kit: &KitId) -> Vec<Bridge> {
        lock(&self.state)
            .bridges
            .iter()
            .filter(|b| b.touches(kit))
            .cloned()
            .collect()
    }

    /// Bridges whose source is the Kit, in creation order.
    pub fn bridges_from(&self, kit: &KitId) -> Vec<Bridge> {
        lock(&self.state)
            .bridges
            .iter()
            .filter(|b| &b.source_kit == kit)
            .cloned()
            .collect()
    }

    /// Every bridge, in creation order.
    pub fn all_bridges(&self) -> Vec<Bridge> {
        lock(&self.state).bridges.clone()
    }

    /// Number of stored bridges.
    pub fn bridge_count(&self) -> usize {
        lock(&self.state).bridges.len()
    }

    /// Try to bridge every ordered pair of distinct registered Kits.
    ///
    /// Pairs that already have a bridge are skipped, so repeated calls
    /// return an empty list. Returns only the bridges created by this call.
    pub fn auto_connect(&self) -> Vec<Bridge> {
        let mut state = lock(&self.state);
        let ids: Vec<KitId> = state.kits.keys().cloned().collect();
        let mut created = Vec::new();

        for from in &ids {
            for to in &ids {
                if from == to || state.is_bridged(from, to) {
                    continue;
                }
                if let Some(bridge) = state.first_connectable(from, to) {
                    state.bridges.push(bridge.clone());
                    created.push(bridge);
                }
            }
        }

        tracing::info!(created = created.len(), "auto-connect finished");
        created
    }
}

// =============================================================================
// TESTS
// =============================================================================
