//! # Orchestrator (AutoBridge)
//!
//! Attaches Kits to projects, wires them together and fires production.
//!
//! ## State machine
//!
//! The engine is either enabled or disabled. Disabling gates only the
//! production side: `attach` still registers Kits and creates bridges, but
//! no producer runs until the engine is enabled again.
//!
//! ## Locking
//!
//! Attachment state sits behind the orchestrator's own lock. The lock is
//! released before calling into the Registry, producers, the executor or
//! the content store; those components serialize themselves.
//!
//! Outputs are stored before they are flowed through bridges.

use crate::bridge::{Bridge, BridgeData, BridgeExecutor, ExecutionResult};
use crate::catalog::{KitCatalog, ProductionTable};
use crate::config::EngineConfig;
use crate::primitives::{CONTEXT_FILE_PATH, CONTEXT_PROJECT_NAME, CONTEXT_PROJECT_PATH};
use crate::producer::KitProducer;
use crate::registry::Registry;
use crate::storage::ContentStorage;
use crate::sync::lock;
use crate::{KitDescriptor, KitId, ProductionContext, ProductionOutput, TriggerKind};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

// =============================================================================
// RESULTS
// =============================================================================

/// Outcome of attaching one Kit to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachResult {
    pub kit_id: KitId,
    /// Outputs of the implicit attach production (empty while disabled).
    pub outputs: Vec<ProductionOutput>,
    /// Bridges between this Kit and the project's other Kits, both directions.
    pub bridges: Vec<Bridge>,
    pub success: bool,
}

impl AttachResult {
    fn failed(kit_id: &KitId) -> Self {
        Self {
            kit_id: kit_id.clone(),
            outputs: Vec::new(),
            bridges: Vec::new(),
            success: false,
        }
    }
}

/// One output pushed through one bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFlow {
    pub bridge: Bridge,
    pub result: ExecutionResult,
}

/// Everything a lifecycle trigger caused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerReport {
    pub outputs: Vec<ProductionOutput>,
    pub flows: Vec<BridgeFlow>,
}

// =============================================================================
// ATTACHMENT STATE
// =============================================================================

#[derive(Debug)]
struct ProjectAttachment {
    name: String,
    kits: BTreeSet<KitId>,
    producers: Vec<Arc<KitProducer>>,
}

#[derive(Debug)]
struct AttachmentState {
    enabled: bool,
    projects: BTreeMap<String, ProjectAttachment>,
    names: BTreeMap<String, String>,
}

/// Display name of a project: the last path component, or the path itself.
pub fn project_name_of(project_path: &str) -> String {
    Path::new(project_path)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| project_path.to_string())
}

fn project_context(project_path: &str, project_name: &str) -> ProductionContext {
    let mut context = ProductionContext::new();
    context.insert(CONTEXT_PROJECT_PATH.to_string(), project_path.to_string());
    context.insert(CONTEXT_PROJECT_NAME.to_string(), project_name.to_string());
    context
}

// =============================================================================
// AUTOBRIDGE
// =============================================================================

/// The orchestrator.
#[derive(Debug)]
pub struct AutoBridge {
    registry: Arc<Registry>,
    executor: Arc<BridgeExecutor>,
    storage: Arc<ContentStorage>,
    catalog: KitCatalog,
    table: ProductionTable,
    history_capacity: usize,
    state: Mutex<AttachmentState>,
}

impl AutoBridge {
    /// Wire an orchestrator to its collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        executor: Arc<BridgeExecutor>,
        storage: Arc<ContentStorage>,
        catalog: KitCatalog,
        table: ProductionTable,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            executor,
            storage,
            catalog,
            table,
            history_capacity: config.history_capacity,
            state: Mutex::new(AttachmentState {
                enabled: config.start_enabled,
                projects: BTreeMap::new(),
                names: BTreeMap::new(),
            }),
        }
    }

    // =========================================================================
    // ENABLE / DISABLE
    // =========================================================================

    /// Allow production.
    pub fn enable(&self) {
        lock(&self.state).enabled = true;
        tracing::info!("production enabled");
    }

    /// Gate production. Topology bookkeeping keeps working.
    pub fn disable(&self) {
        lock(&self.state).enabled = false;
        tracing::info!("production disabled");
    }

    /// Whether production is enabled.
    pub fn is_enabled(&self) -> bool {
        lock(&self.state).enabled
    }

    // =========================================================================
    // ATTACH / DETACH
    // =========================================================================

    /// Give a project an explicit display name instead of its last path
    /// component. Applies to content stored from now on.
    pub fn name_project(&self, project_path: &str, name: &str) {
        let mut state = lock(&self.state);
        state.names.insert(project_path.to_string(), name.to_string());
        if let Some(project) = state.projects.get_mut(project_path) {
            project.name = name.to_string();
        }
    }

    fn resolve(&self, kit: &KitId) -> Option<KitDescriptor> {
        if let Some(descriptor) = self.registry.get_kit(kit) {
            return Some(descriptor);
        }

        let descriptor = self.catalog.get(kit)?.clone();
        match self.registry.register(descriptor.clone()) {
            Ok(()) => Some(descriptor),
            Err(e) => {
                tracing::warn!(kit = %kit, error = %e, "catalog descriptor rejected");
                None
            }
        }
    }

    /// Attach a Kit to a project.
    ///
    /// Registers the Kit from the catalog if needed, records the attachment,
    /// bridges it with every other Kit of the project in both directions,
    /// then runs the implicit attach production and stores its outputs.
    /// Re-attaching keeps a single producer and creates no duplicate bridges.
    pub fn attach(&self, kit: &KitId, project_path: &str) -> AttachResult {
        let Some(descriptor) = self.resolve(kit) else {
            tracing::warn!(kit = %kit, project = project_path, "attach of unknown kit");
            return AttachResult::failed(kit);
        };

        let (producer, others, project_name, enabled) = {
            let mut state = lock(&self.state);
            let enabled = state.enabled;
            let name = state
                .names
                .get(project_path)
                .cloned()
                .unwrap_or_else(|| project_name_of(project_path));
            let project = state
                .projects
                .entry(project_path.to_string())
                .or_insert_with(|| ProjectAttachment {
                    name,
                    kits: BTreeSet::new(),
                    producers: Vec::new(),
                });

            project.kits.insert(kit.clone());
            let producer = match project.producers.iter().find(|p| p.kit_id() == kit) {
                Some(existing) => Arc::clone(existing),
                None => {
                    let created = Arc::new(KitProducer::new(
                        &descriptor,
                        project_path,
                        self.table.get(kit),
                        self.history_capacity,
                    ));
                    project.producers.push(Arc::clone(&created));
                    created
                }
            };
            let others: Vec<KitId> = project.kits.iter().filter(|k| *k != kit).cloned().collect();
            (producer, others, project.name.clone(), enabled)
        };

        let mut bridges = Vec::new();
        for other in &others {
            bridges.extend(self.registry.create_bridge(kit, other));
            bridges.extend(self.registry.create_bridge(other, kit));
        }

        let outputs = if enabled {
            producer.produce(
                TriggerKind::Attach,
                &project_context(project_path, &project_name),
            )
        } else {
            tracing::debug!(kit = %kit, "attach production skipped while disabled");
            Vec::new()
        };

        for output in &outputs {
            self.storage.store(output.clone(), project_path, &project_name);
        }

        tracing::info!(
            kit = %kit,
            project = project_path,
            bridges = bridges.len(),
            outputs = outputs.len(),
            "kit attached"
        );

        AttachResult {
            kit_id: kit.clone(),
            outputs,
            bridges,
            success: true,
        }
    }

    /// Attach several Kits, one after the other, in call order.
    ///
    /// Not parallelized: each attach changes the topology the next one sees.
    pub fn attach_all(&self, kits: &[KitId], project_path: &str) -> Vec<AttachResult> {
        kits.iter().map(|kit| self.attach(kit, project_path)).collect()
    }

    /// Detach a Kit from a project. Bridges and stored content remain.
    ///
    /// Returns whether the Kit was attached.
    pub fn detach(&self, kit: &KitId, project_path: &str) -> bool {
        let mut state = lock(&self.state);
        let Some(project) = state.projects.get_mut(project_path) else {
            return false;
        };

        let removed = project.kits.remove(kit);
        project.producers.retain(|p| p.kit_id() != kit);
        if project.kits.is_empty() {
            state.projects.remove(project_path);
        }

        if removed {
            tracing::info!(kit = %kit, project = project_path, "kit detached");
        }
        removed
    }

    /// Detach every Kit from a project. Returns how many were attached.
    pub fn detach_all(&self, project_path: &str) -> usize {
        let removed = lock(&self.state)
            .projects
            .remove(project_path)
            .map(|p| p.kits.len())
            .unwrap_or(0);
        tracing::info!(project = project_path, removed, "project detached");
        removed
    }

    // =========================================================================
    // LIFECYCLE TRIGGERS
    // =========================================================================

    /// Run every producer of the project for `trigger`, store the outputs,
    /// then flow each output through the bridges leaving its Kit.
    ///
    /// `extra` is merged over the project context. Returns an empty report
    /// while disabled or when the project has nothing attached.
    pub fn trigger(
        &self,
        trigger: TriggerKind,
        extra: &ProductionContext,
        project_path: &str,
    ) -> TriggerReport {
        let (producers, project_name) = {
            let state = lock(&self.state);
            if !state.enabled {
                tracing::debug!(%trigger, project = project_path, "trigger ignored while disabled");
                return TriggerReport::default();
            }
            match state.projects.get(project_path) {
                Some(project) => (project.producers.clone(), project.name.clone()),
                None => return TriggerReport::default(),
            }
        };

        let mut context = project_context(project_path, &project_name);
        context.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        let outputs: Vec<ProductionOutput> = producers
            .iter()
            .flat_map(|producer| producer.produce(trigger, &context))
            .collect();

        for output in &outputs {
            self.storage.store(output.clone(), project_path, &project_name);
        }

        let flows = self.flow(&outputs);

        tracing::info!(
            %trigger,
            project = project_path,
            outputs = outputs.len(),
            flows = flows.len(),
            "trigger processed"
        );

        TriggerReport { outputs, flows }
    }

    fn flow(&self, outputs: &[ProductionOutput]) -> Vec<BridgeFlow> {
        let mut bridges_by_kit: BTreeMap<&KitId, Vec<Bridge>> = BTreeMap::new();
        let mut flows = Vec::new();

        for output in outputs {
            let bridges = bridges_by_kit
                .entry(&output.kit_id)
                .or_insert_with(|| self.registry.bridges_from(&output.kit_id));

            for bridge in bridges.iter() {
                let registered = self.registry.contains(&bridge.target_kit);
                debug_assert!(registered, "bridge targets an unregistered kit");
                if !registered {
                    tracing::warn!(
                        target_kit = %bridge.target_kit,
                        "bridge targets an unregistered kit"
                    );
                    continue;
                }
                let result = self.executor.execute(&BridgeData::from(output), bridge);
                flows.push(BridgeFlow {
                    bridge: bridge.clone(),
                    result,
                });
            }
        }

        flows
    }

    /// Project creation lifecycle event.
    pub fn on_project_create(&self, project_path: &str) -> Vec<ProductionOutput> {
        self.trigger(TriggerKind::ProjectCreate, &ProductionContext::new(), project_path)
            .outputs
    }

    /// File change lifecycle event.
    pub fn on_file_change(&self, file_path: &str, project_path: &str) -> Vec<ProductionOutput> {
        self.trigger(TriggerKind::FileChange, &file_context(file_path), project_path)
            .outputs
    }

    /// File save lifecycle event.
    pub fn on_file_save(&self, file_path: &str, project_path: &str) -> Vec<ProductionOutput> {
        self.trigger(TriggerKind::FileSave, &file_context(file_path), project_path)
            .outputs
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Kits attached to a project, in id order.
    pub fn attached_kits(&self, project_path: &str) -> Vec<KitId> {
        lock(&self.state)
            .projects
            .get(project_path)
            .map(|p| p.kits.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Project paths with at least one attached Kit.
    pub fn projects(&self) -> Vec<String> {
        lock(&self.state).projects.keys().cloned().collect()
    }

    /// Number of active producers for a project.
    pub fn producer_count(&self, project_path: &str) -> usize {
        lock(&self.state)
            .projects
            .get(project_path)
            .map(|p| p.producers.len())
            .unwrap_or(0)
    }

    /// The producer for a (Kit, project) pairing, if attached.
    pub fn producer(&self, kit: &KitId, project_path: &str) -> Option<Arc<KitProducer>> {
        lock(&self.state)
            .projects
            .get(project_path)?
            .producers
            .iter()
            .find(|p| p.kit_id() == kit)
            .cloned()
    }
}

fn file_context(file_path: &str) -> ProductionContext {
    let mut context = ProductionContext::new();
    context.insert(CONTEXT_FILE_PATH.to_string(), file_path.to_string());
    context
}

// =============================================================================
// TESTS
// =============================================================================
