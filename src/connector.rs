//! Connector trait and `--about` metadata
//!
//! Defines the operations the CLI drives: about, discovery, connection test
//! and sync.

use crate::catalog::{Catalog, Selection};
use crate::engine::{SyncConfig, SyncStats};
use crate::error::Result;
use crate::singer::MessageWriter;
use crate::state::StateManager;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

// ============================================================================
// About
// ============================================================================

/// Tap description printed by `--about`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub capabilities: Vec<String>,
    /// JSON Schema of the settings
    pub settings: JsonValue,
}

impl AboutInfo {
    /// Render as the markdown `--about --format markdown` prints
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# `{}`\n", self.name);
        let _ = writeln!(md, "{}\n", self.description);
        let _ = writeln!(md, "Built with version `{}`.\n", self.version);

        md.push_str("## Capabilities\n\n");
        for capability in &self.capabilities {
            let _ = writeln!(md, "* `{capability}`");
        }

        md.push_str("\n## Settings\n\n");
        md.push_str("| Setting | Required | Default | Description |\n");
        md.push_str("|:--------|:--------:|:-------:|:------------|\n");

        let required: Vec<&str> = self.settings["required"]
            .as_array()
            .map(|r| r.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default();

        if let Some(properties) = self.settings["properties"].as_object() {
            for (name, property) in properties {
                let is_required = if required.contains(&name.as_str()) {
                    "True"
                } else {
                    "False"
                };
                let default = property
                    .get("default")
                    .map_or_else(|| "None".to_string(), ToString::to_string);
                let description = property["description"].as_str().unwrap_or_default();
                let _ = writeln!(md, "| {name} | {is_required} | {default} | {description} |");
            }
        }

        md.push_str("\nA full list of supported settings and capabilities is available by running: `");
        md.push_str(&self.name);
        md.push_str(" --about`\n");
        md
    }
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector Trait
// ============================================================================

/// Everything a sync run needs besides the connector itself
#[derive(Debug)]
pub struct SyncRequest {
    pub selection: Selection,
    pub state: StateManager,
    pub writer: MessageWriter,
    pub config: SyncConfig,
}

/// Core trait the CLI drives
#[async_trait]
pub trait Connector: Send + Sync {
    /// Name, version, capabilities and settings
    fn about(&self) -> AboutInfo;

    /// Catalog of every stream
    fn discover(&self) -> Catalog;

    /// Dry-run sync reading at most one record per stream, writing nothing
    async fn test_connection(&self) -> Result<CheckResult>;

    /// Sync the selected streams
    async fn sync(&self, request: SyncRequest) -> Result<SyncStats>;
}
