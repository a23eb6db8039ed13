//! # Query Module
//!
//! Structured query types for the content store.
//!
//! - One variant per index of the store
//! - Deterministic: results are always returned in content id order

use crate::KitId;

/// Content query operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentQuery {
    /// Full-text search, AND over tokens.
    Search(String),

    /// Everything captured for a project path.
    Project(String),

    /// Everything produced by a Kit.
    Kit(KitId),

    /// Everything with a given output type.
    OutputType(String),

    /// Every stored item.
    All,
}

impl ContentQuery {
    /// Search helper.
    #[must_use]
    pub fn search(text: impl Into<String>) -> Self {
        Self::Search(text.into())
    }

    /// Project helper.
    #[must_use]
    pub fn project(path: impl Into<String>) -> Self {
        Self::Project(path.into())
    }

    /// Kit helper.
    #[must_use]
    pub fn kit(id: impl Into<KitId>) -> Self {
        Self::Kit(id.into())
    }

    /// Output type helper.
    #[must_use]
    pub fn output_type(name: impl Into<String>) -> Self {
        Self::OutputType(name.into())
    }
}

// =============================================================================
// TESTS
// =============================================================================
