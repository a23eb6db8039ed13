//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::ExportFormat;
use kitbridge::{RunReport, Scenario, run_scenario};
use kitbridge_core::{
    Bridge, Engine, KitCatalog, KitDescriptor, KitId, KitbridgeError, MLExportRecord,
    StoredContent, canonical_checksum, canonical_hash, export_canonical,
};
use std::path::{Path, PathBuf};

// =============================================================================
// PATH VALIDATION
// =============================================================================

/// Validate an output path.
///
/// The parent directory must exist; the returned path is the canonical
/// parent joined with the original file name.
fn validate_output_path(path: &Path) -> Result<PathBuf, KitbridgeError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        KitbridgeError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(KitbridgeError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| KitbridgeError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn port_list(ports: &[kitbridge_core::DataPort]) -> String {
    ports
        .iter()
        .map(|p| format!("{}:{}", p.name, p.data_type))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_bridge(bridge: &Bridge) -> String {
    format!(
        "{}.{} -> {}.{} ({})",
        bridge.source_kit,
        bridge.source_port.name,
        bridge.target_kit,
        bridge.target_port.name,
        bridge.source_port.data_type
    )
}

fn print_kit(descriptor: &KitDescriptor) {
    println!("{} ({})", descriptor.id, descriptor.name);
    println!("  inputs:   {}", port_list(&descriptor.inputs));
    println!("  outputs:  {}", port_list(&descriptor.outputs));
    println!(
        "  triggers: {}",
        descriptor
            .triggers
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

fn print_hits(query: &str, hits: &[StoredContent]) {
    println!("Search '{}': {} hit(s)", query, hits.len());
    for hit in hits.iter().take(10) {
        println!(
            "  #{} [{}] {} / {}: {}",
            hit.id.0,
            hit.project_name,
            hit.output.kit_id,
            hit.output.output_type,
            hit.output.content.lines().next().unwrap_or("")
        );
    }
    if hits.len() > 10 {
        println!("  ... and {} more", hits.len() - 10);
    }
}

fn parse_kit_list(list: &str) -> Vec<KitId> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(KitId::new)
        .collect()
}

// =============================================================================
// KITS COMMAND
// =============================================================================

/// List the catalog.
pub fn cmd_kits(json_mode: bool) -> Result<(), KitbridgeError> {
    let kits = KitCatalog::all();

    if json_mode {
        print_json(&serde_json::json!({ "kits": kits }));
        return Ok(());
    }

    println!("KitBridge Catalog");
    println!("=================");
    for descriptor in &kits {
        println!();
        print_kit(descriptor);
    }

    Ok(())
}

// =============================================================================
// CONNECT COMMAND
// =============================================================================

/// Register the whole catalog and auto-connect it.
pub fn cmd_connect(json_mode: bool) -> Result<(), KitbridgeError> {
    let engine = Engine::new();
    for descriptor in KitCatalog::all() {
        engine.registry().register(descriptor)?;
    }
    let bridges = engine.registry().auto_connect();

    if json_mode {
        print_json(&serde_json::json!({
            "kit_count": engine.registry().kit_count(),
            "bridges": bridges,
        }));
        return Ok(());
    }

    println!(
        "Registered {} kits, created {} bridges:",
        engine.registry().kit_count(),
        bridges.len()
    );
    for bridge in &bridges {
        println!("  {}", describe_bridge(bridge));
    }

    Ok(())
}

// =============================================================================
// ACTIVATE COMMAND
// =============================================================================

/// Activate a project in a fresh engine.
pub fn cmd_activate(
    json_mode: bool,
    project: &str,
    kits: Option<&str>,
    search: Option<&str>,
) -> Result<(), KitbridgeError> {
    if project.trim().is_empty() {
        return Err(KitbridgeError::Config("Project path is empty".to_string()));
    }

    let engine = Engine::new();
    let activation = match kits {
        Some(list) => engine.activate_kits(&parse_kit_list(list), project),
        None => engine.activate(project),
    };
    let bridges = engine.registry().all_bridges();
    let stats = engine.storage_stats();
    let hits = search.map(|q| engine.search(q));

    if json_mode {
        let attached: Vec<_> = activation
            .attached
            .iter()
            .map(|r| {
                serde_json::json!({
                    "kit": r.kit_id,
                    "success": r.success,
                    "outputs": r.outputs,
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "project": project,
            "attached": attached,
            "created": activation.created,
            "bridges": bridges,
            "stats": stats,
            "search": hits,
        }));
        return Ok(());
    }

    println!("Activated {}", project);
    println!();
    for result in &activation.attached {
        if result.success {
            println!("  + {} ({} output(s))", result.kit_id, result.outputs.len());
        } else {
            println!("  ! {} (unknown kit)", result.kit_id);
        }
    }
    println!();
    println!("Project creation produced {} output(s):", activation.created.len());
    for output in &activation.created {
        println!("  {} / {} [{}]", output.kit_id, output.output_type, output.data_type);
    }
    println!();
    println!("Bridges ({}):", bridges.len());
    for bridge in &bridges {
        println!("  {}", describe_bridge(bridge));
    }
    println!();
    println!(
        "Stored: {} item(s), {} kit(s), {} type(s), {} indexed word(s)",
        stats.total_content, stats.kit_count, stats.type_count, stats.indexed_words
    );

    if let (Some(query), Some(hits)) = (search, &hits) {
        println!();
        print_hits(query, hits);
    }

    Ok(())
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Replay a scenario file.
pub async fn cmd_run(
    json_mode: bool,
    scenario_path: &Path,
    searches: &[String],
    export: Option<&Path>,
    format: ExportFormat,
) -> Result<(), KitbridgeError> {
    let scenario = Scenario::load(scenario_path)?;
    let validated_export = export.map(validate_output_path).transpose()?;

    let (engine, report) = run_scenario(scenario).await?;
    let results: Vec<(&String, Vec<StoredContent>)> =
        searches.iter().map(|q| (q, engine.search(q))).collect();

    let exported = match &validated_export {
        Some(path) => Some(write_export(&engine.export_for_ml(), path, format)?),
        None => None,
    };

    if json_mode {
        let search: Vec<_> = results
            .iter()
            .map(|(q, hits)| serde_json::json!({ "query": q, "hits": hits }))
            .collect();
        print_json(&serde_json::json!({
            "report": report,
            "search": search,
            "export": exported,
        }));
        return Ok(());
    }

    print_report(&report);
    for (query, hits) in &results {
        println!();
        print_hits(query, hits);
    }
    if let Some(summary) = exported {
        println!();
        println!("{}", summary);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Scenario Report");
    println!("===============");
    for project in &report.projects {
        println!();
        println!("{}", project.path);
        println!("  attached: {}", project.attached.join(", "));
        if !project.rejected.is_empty() {
            println!("  rejected: {}", project.rejected.join(", "));
        }
        println!(
            "  events: {}  outputs: {}  flows: {} ({} ok)  detached: {}",
            project.events,
            project.outputs,
            project.flows,
            project.successful_flows,
            project.detached
        );
    }
    println!();
    println!(
        "Bridges: {}  Executions: {} ({} ok, {} failed)",
        report.bridges,
        report.execution.total,
        report.execution.successes,
        report.execution.failures
    );
    println!(
        "Stored: {} item(s) across {} project(s)",
        report.storage.total_content, report.storage.project_count
    );
}

/// Write the export and return a one-line summary.
fn write_export(
    records: &[MLExportRecord],
    path: &Path,
    format: ExportFormat,
) -> Result<String, KitbridgeError> {
    let (data, detail) = match format {
        ExportFormat::Json => {
            let data = serde_json::to_vec_pretty(records)
                .map_err(|e| KitbridgeError::SerializationError(e.to_string()))?;
            (data, String::new())
        }
        ExportFormat::Canonical => {
            let data = export_canonical(records)?;
            let detail = format!(
                " (checksum {}, blake3 {})",
                canonical_checksum(records),
                canonical_hash(&data)
            );
            (data, detail)
        }
    };

    std::fs::write(path, &data)
        .map_err(|e| KitbridgeError::IoError(format!("Write file: {}", e)))?;

    tracing::info!(path = %path.display(), records = records.len(), "export written");
    Ok(format!(
        "Exported {} record(s), {} bytes to {}{}",
        records.len(),
        data.len(),
        path.display(),
        detail
    ))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kit_list_is_trimmed() {
        assert_eq!(
            parse_kit_list(" code-parser, ,doc-generator "),
            vec![KitId::new("code-parser"), KitId::new("doc-generator")]
        );
    }

    #[test]
    fn bridge_description_names_ports() {
        let engine = Engine::new();
        engine.activate("/p");
        let bridge = engine.registry().all_bridges().into_iter().next().expect("bridge");
        assert!(describe_bridge(&bridge).contains(" -> "));
    }
}
