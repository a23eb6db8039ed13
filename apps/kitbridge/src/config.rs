//! # Scenario Configuration
//!
//! A scenario is a TOML file describing an engine, the projects it serves
//! and the lifecycle events to replay against them.
//!
//! ```toml
//! [engine]
//! start_enabled = true
//! history_capacity = 100
//!
//! [[project]]
//! path = "/work/demo"
//! name = "Demo"            # optional, defaults to the last path component
//! kits = ["code-parser"]   # empty or missing means every catalog kit
//!
//! [[event]]
//! project = "/work/demo"
//! kind = "file_save"       # project_create | file_change | file_save | manual | detach
//! file = "src/main.rs"
//! ```

use kitbridge_core::{EngineConfig, KitId, KitbridgeError, TriggerKind};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Maximum scenario file size (4 MB).
const MAX_SCENARIO_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// A parsed scenario.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectConfig>,

    #[serde(default, rename = "event")]
    pub events: Vec<EventConfig>,
}

/// One project and the Kits attached to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub path: String,
    pub name: Option<String>,
    #[serde(default)]
    pub kits: Vec<String>,
}

impl ProjectConfig {
    /// Kit ids to attach; `None` means the whole catalog.
    pub fn kit_ids(&self) -> Option<Vec<KitId>> {
        if self.kits.is_empty() {
            None
        } else {
            Some(self.kits.iter().map(|k| KitId::new(k.as_str())).collect())
        }
    }
}

/// Kinds of scenario events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ProjectCreate,
    FileChange,
    FileSave,
    Manual,
    Detach,
}

impl EventKind {
    /// The production trigger this event fires, if any.
    pub fn trigger(self) -> Option<TriggerKind> {
        match self {
            EventKind::ProjectCreate => Some(TriggerKind::ProjectCreate),
            EventKind::FileChange => Some(TriggerKind::FileChange),
            EventKind::FileSave => Some(TriggerKind::FileSave),
            EventKind::Manual => Some(TriggerKind::Manual),
            EventKind::Detach => None,
        }
    }

    fn needs_file(self) -> bool {
        matches!(self, EventKind::FileChange | EventKind::FileSave)
    }
}

/// One lifecycle event for a project.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventConfig {
    pub project: String,
    pub kind: EventKind,
    pub file: Option<String>,
    /// Kit to detach; without it a detach event detaches every Kit.
    pub kit: Option<String>,
}

impl Scenario {
    /// Parse and validate a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, KitbridgeError> {
        let scenario: Scenario = toml::from_str(text)
            .map_err(|e| KitbridgeError::Config(format!("Invalid scenario: {}", e)))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read, parse and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self, KitbridgeError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            KitbridgeError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_SCENARIO_FILE_SIZE {
            return Err(KitbridgeError::Config(format!(
                "Scenario file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_SCENARIO_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            KitbridgeError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Check cross references between projects and events.
    pub fn validate(&self) -> Result<(), KitbridgeError> {
        let mut paths = BTreeSet::new();
        for project in &self.projects {
            if project.path.trim().is_empty() {
                return Err(KitbridgeError::Config("Project path is empty".to_string()));
            }
            if !paths.insert(project.path.as_str()) {
                return Err(KitbridgeError::Config(format!(
                    "Project '{}' is declared twice",
                    project.path
                )));
            }
        }

        for (index, event) in self.events.iter().enumerate() {
            if !paths.contains(event.project.as_str()) {
                return Err(KitbridgeError::Config(format!(
                    "Event {} refers to undeclared project '{}'",
                    index, event.project
                )));
            }
            if event.kind.needs_file() && event.file.as_deref().is_none_or(str::is_empty) {
                return Err(KitbridgeError::Config(format!(
                    "Event {} needs a file",
                    index
                )));
            }
        }

        Ok(())
    }

    /// Events for one project, in file order.
    pub fn events_for<'a>(
        &'a self,
        project_path: &'a str,
    ) -> impl Iterator<Item = &'a EventConfig> {
        self.events.iter().filter(move |e| e.project == project_path)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
[engine]
history_capacity = 10

[[project]]
path = "/work/demo"
name = "Demo"
kits = ["code-parser", "doc-generator"]

[[project]]
path = "/work/other"

[[event]]
project = "/work/demo"
kind = "file_save"
file = "src/main.rs"

[[event]]
project = "/work/other"
kind = "project_create"
"#;

    #[test]
    fn parses_full_scenario() {
        let scenario = Scenario::from_toml_str(SCENARIO).expect("parse");

        assert_eq!(scenario.engine.history_capacity, 10);
        assert!(scenario.engine.start_enabled);
        assert_eq!(scenario.projects.len(), 2);
        assert_eq!(scenario.projects[0].name.as_deref(), Some("Demo"));
        assert_eq!(
            scenario.projects[0].kit_ids(),
            Some(vec![KitId::new("code-parser"), KitId::new("doc-generator")])
        );
        assert_eq!(scenario.projects[1].kit_ids(), None);
        assert_eq!(scenario.events[0].kind, EventKind::FileSave);
        assert_eq!(scenario.events_for("/work/other").count(), 1);
    }

    #[test]
    fn empty_scenario_is_valid() {
        let scenario = Scenario::from_toml_str("").expect("parse");
        assert!(scenario.projects.is_empty());
        assert_eq!(scenario.engine, EngineConfig::default());
    }

    #[test]
    fn rejects_undeclared_project() {
        let text = r#"
[[event]]
project = "/nowhere"
kind = "project_create"
"#;
        assert!(matches!(
            Scenario::from_toml_str(text),
            Err(KitbridgeError::Config(_))
        ));
    }

    #[test]
    fn rejects_file_event_without_file() {
        let text = r#"
[[project]]
path = "/p"

[[event]]
project = "/p"
kind = "file_change"
"#;
        assert!(Scenario::from_toml_str(text).is_err());
    }

    #[test]
    fn rejects_unknown_event_kind() {
        let text = r#"
[[project]]
path = "/p"

[[event]]
project = "/p"
kind = "explode"
"#;
        assert!(Scenario::from_toml_str(text).is_err());
    }

    #[test]
    fn rejects_duplicate_project() {
        let text = r#"
[[project]]
path = "/p"

[[project]]
path = "/p"
"#;
        assert!(Scenario::from_toml_str(text).is_err());
    }
}
