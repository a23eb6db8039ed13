//! # Scenario Runner
//!
//! Replays a scenario against one shared engine.
//!
//! Each project runs as its own blocking task: its Kits are attached in
//! declaration order and its events replayed in file order. Distinct
//! projects run concurrently; the engine's services serialize themselves.

use crate::config::{EventConfig, EventKind, ProjectConfig, Scenario};
use kitbridge_core::{
    Engine, ExecutionStats, KitId, KitbridgeError, ProductionContext, StorageStats,
    primitives::CONTEXT_FILE_PATH,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;

/// What happened to one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    pub path: String,
    /// Kits attached successfully.
    pub attached: Vec<String>,
    /// Kits that could not be attached (unknown ids).
    pub rejected: Vec<String>,
    pub events: usize,
    pub outputs: usize,
    pub flows: usize,
    pub successful_flows: usize,
    pub detached: usize,
}

/// Summary of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Per-project reports, ordered by path.
    pub projects: Vec<ProjectReport>,
    pub bridges: usize,
    pub execution: ExecutionStats,
    pub storage: StorageStats,
}

/// Build an engine for the scenario and run it.
pub async fn run_scenario(scenario: Scenario) -> Result<(Arc<Engine>, RunReport), KitbridgeError> {
    let engine = Arc::new(Engine::with_config(scenario.engine));
    let report = run(Arc::clone(&engine), Arc::new(scenario)).await?;
    Ok((engine, report))
}

/// Run every project of a scenario against `engine`.
pub async fn run(
    engine: Arc<Engine>,
    scenario: Arc<Scenario>,
) -> Result<RunReport, KitbridgeError> {
    let mut tasks = JoinSet::new();

    for index in 0..scenario.projects.len() {
        let engine = Arc::clone(&engine);
        let scenario = Arc::clone(&scenario);
        tasks.spawn_blocking(move || {
            let project = &scenario.projects[index];
            run_project(&engine, project, scenario.events_for(&project.path))
        });
    }

    let mut projects = Vec::with_capacity(scenario.projects.len());
    while let Some(joined) = tasks.join_next().await {
        let report = joined
            .map_err(|e| KitbridgeError::IoError(format!("Project task failed: {}", e)))?;
        projects.push(report);
    }
    projects.sort_by(|a, b| a.path.cmp(&b.path));

    let report = RunReport {
        projects,
        bridges: engine.registry().bridge_count(),
        execution: engine.executor().stats(),
        storage: engine.storage_stats(),
    };

    tracing::info!(
        projects = report.projects.len(),
        bridges = report.bridges,
        stored = report.storage.total_content,
        "scenario complete"
    );

    Ok(report)
}

fn run_project<'a>(
    engine: &Engine,
    project: &ProjectConfig,
    events: impl Iterator<Item = &'a EventConfig>,
) -> ProjectReport {
    let auto_bridge = engine.auto_bridge();
    let mut report = ProjectReport {
        path: project.path.clone(),
        ..ProjectReport::default()
    };

    if let Some(name) = &project.name {
        auto_bridge.name_project(&project.path, name);
    }

    let kits = project.kit_ids().unwrap_or_else(|| engine.catalog().ids());
    for result in auto_bridge.attach_all(&kits, &project.path) {
        report.outputs += result.outputs.len();
        if result.success {
            report.attached.push(result.kit_id.to_string());
        } else {
            report.rejected.push(result.kit_id.to_string());
        }
    }

    for event in events {
        report.events += 1;
        tracing::debug!(project = %project.path, kind = ?event.kind, "replaying event");

        match event.kind.trigger() {
            Some(trigger) => {
                let mut context = ProductionContext::new();
                if let Some(file) = &event.file {
                    context.insert(CONTEXT_FILE_PATH.to_string(), file.clone());
                }
                let outcome = auto_bridge.trigger(trigger, &context, &project.path);
                report.outputs += outcome.outputs.len();
                report.flows += outcome.flows.len();
                report.successful_flows +=
                    outcome.flows.iter().filter(|f| f.result.success).count();
            }
            None => {
                debug_assert_eq!(event.kind, EventKind::Detach);
                report.detached += match &event.kit {
                    Some(kit) => {
                        usize::from(auto_bridge.detach(&KitId::new(kit.as_str()), &project.path))
                    }
                    None => auto_bridge.detach_all(&project.path),
                };
            }
        }
    }

    report
}
