//! # kitbridge
//!
//! Scenario loading and replay for the KitBridge binary.
//!
//! - `config`: TOML scenario format (engine settings, projects, events)
//! - `runner`: concurrent replay of a scenario against one engine

pub mod config;
pub mod runner;

pub use config::{EventConfig, EventKind, ProjectConfig, Scenario};
pub use runner::{ProjectReport, RunReport, run, run_scenario};
