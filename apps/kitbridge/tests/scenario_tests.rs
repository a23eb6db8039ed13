//! Integration tests for scenario loading and replay.

use kitbridge::{Scenario, run, run_scenario};
use kitbridge_core::{CatalogKit, Engine, EngineConfig, KitbridgeError};
use std::io::Write;
use std::sync::Arc;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Write a scenario to a temporary file and load it back.
fn load(text: &str) -> Result<Scenario, KitbridgeError> {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(text.as_bytes()).expect("write");
    Scenario::load(file.path())
}

// =============================================================================
// LOADING
// =============================================================================

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = Scenario::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(KitbridgeError::IoError(_))));
}

#[test]
fn malformed_toml_is_a_config_error() {
    assert!(matches!(
        load("[[project]\npath = "),
        Err(KitbridgeError::Config(_))
    ));
}

// =============================================================================
// REPLAY
// =============================================================================

#[tokio::test]
async fn every_output_is_stored() {
    let scenario = load(
        r#"
[[project]]
path = "/work/alpha"
kits = ["code-parser", "doc-generator", "search-indexer"]

[[project]]
path = "/work/beta"

[[event]]
project = "/work/alpha"
kind = "file_save"
file = "src/lib.rs"

[[event]]
project = "/work/beta"
kind = "project_create"

[[event]]
project = "/work/beta"
kind = "file_change"
file = "src/main.rs"
"#,
    )
    .expect("load");

    let (engine, report) = run_scenario(scenario).await.expect("run");

    let paths: Vec<_> = report.projects.iter().map(|p| p.path.as_str()).collect();
    assert_eq!(paths, vec!["/work/alpha", "/work/beta"]);
    assert_eq!(report.projects[0].attached.len(), 3);
    assert_eq!(report.projects[1].attached.len(), CatalogKit::ALL.len());
    assert_eq!(report.projects[1].events, 2);

    let produced: usize = report.projects.iter().map(|p| p.outputs).sum();
    assert_eq!(report.storage.total_content, produced);
    assert_eq!(report.storage.project_count, 2);
    assert_eq!(engine.project_content("/work/alpha").len(), report.projects[0].outputs);

    let flows: usize = report.projects.iter().map(|p| p.flows).sum();
    assert_eq!(report.execution.total, flows as u64);
    assert!(!engine.search("lib").is_empty());
}

#[tokio::test]
async fn detach_stops_later_production() {
    let scenario = load(
        r#"
[[project]]
path = "/p"
kits = ["code-parser"]

[[event]]
project = "/p"
kind = "file_save"
file = "src/one.rs"

[[event]]
project = "/p"
kind = "detach"
kit = "code-parser"

[[event]]
project = "/p"
kind = "file_save"
file = "src/two.rs"
"#,
    )
    .expect("load");

    let (engine, report) = run_scenario(scenario).await.expect("run");
    let project = &report.projects[0];

    // parser-status on attach, then symbols, source and entities on the first save
    assert_eq!(project.outputs, 4);
    assert_eq!(project.detached, 1);
    assert!(engine.search("two").is_empty());
    assert!(engine.auto_bridge().attached_kits("/p").is_empty());
}

#[tokio::test]
async fn unknown_kits_are_rejected_not_fatal() {
    let scenario = load(
        r#"
[[project]]
path = "/p"
kits = ["code-parser", "no-such-kit"]
"#,
    )
    .expect("load");

    let (_, report) = run_scenario(scenario).await.expect("run");
    assert_eq!(report.projects[0].attached, vec!["code-parser".to_string()]);
    assert_eq!(report.projects[0].rejected, vec!["no-such-kit".to_string()]);
}

#[tokio::test]
async fn project_name_override_reaches_the_store() {
    let scenario = load(
        r#"
[[project]]
path = "/work/demo"
name = "Demo App"
kits = ["doc-generator"]
"#,
    )
    .expect("load");

    let (engine, _) = run_scenario(scenario).await.expect("run");
    let content = engine.project_content("/work/demo");
    assert!(!content.is_empty());
    assert!(content.iter().all(|c| c.project_name == "Demo App"));
}

#[tokio::test]
async fn disabled_engine_only_wires() {
    let scenario = load(
        r#"
[engine]
start_enabled = false

[[project]]
path = "/p"

[[event]]
project = "/p"
kind = "project_create"
"#,
    )
    .expect("load");

    let (_, report) = run_scenario(scenario).await.expect("run");
    assert_eq!(report.storage.total_content, 0);
    assert!(report.bridges > 0);
}

#[tokio::test]
async fn concurrent_projects_share_one_topology() {
    let mut text = String::new();
    for i in 0..16 {
        text.push_str(&format!(
            "[[project]]\npath = \"/work/p{i}\"\n\n[[event]]\nproject = \"/work/p{i}\"\nkind = \"file_save\"\nfile = \"src/f{i}.rs\"\n\n"
        ));
    }
    let scenario = Arc::new(Scenario::from_toml_str(&text).expect("parse"));

    let single = Engine::new();
    single.activate("/solo");
    let expected_bridges = single.registry().bridge_count();

    let engine = Arc::new(Engine::with_config(EngineConfig::default()));
    let report = run(Arc::clone(&engine), scenario).await.expect("run");

    assert_eq!(report.projects.len(), 16);
    // Bridges are per kit pair, not per project
    assert_eq!(report.bridges, expected_bridges);
    assert_eq!(report.storage.project_count, 16);

    let produced: usize = report.projects.iter().map(|p| p.outputs).sum();
    assert_eq!(engine.storage().len(), produced);

    // Content ids stay unique under concurrent stores
    let ids: std::collections::BTreeSet<_> = engine.storage().all().iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), produced);
}
