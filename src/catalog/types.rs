//! Catalog types

use crate::error::{Error, Result};
use crate::streams::{StreamDefinition, StreamRegistry};
use crate::types::{JsonObject, JsonValue, ReplicationMethod};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;

/// A Singer catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub streams: Vec<CatalogEntry>,
}

/// One stream in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub schema: JsonValue,
    #[serde(default)]
    pub key_properties: Vec<String>,
    #[serde(default)]
    pub replication_method: ReplicationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

/// Metadata attached to a breadcrumb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    #[serde(default)]
    pub metadata: JsonObject,
}

impl MetadataEntry {
    fn bool_field(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(JsonValue::as_bool)
    }

    /// Explicit `selected` flag
    pub fn selected(&self) -> Option<bool> {
        self.bool_field("selected")
    }

    /// `selected-by-default` flag
    pub fn selected_by_default(&self) -> Option<bool> {
        self.bool_field("selected-by-default")
    }

    /// `inclusion` value
    pub fn inclusion(&self) -> Option<&str> {
        self.metadata.get("inclusion").and_then(JsonValue::as_str)
    }

    /// Property name for a `["properties", name]` breadcrumb
    pub fn property(&self) -> Option<&str> {
        match self.breadcrumb.as_slice() {
            [kind, name] if kind == "properties" => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_stream_level(&self) -> bool {
        self.breadcrumb.is_empty()
    }
}

impl Catalog {
    /// Build the discovery catalog
    pub fn discover(registry: &StreamRegistry) -> Self {
        Self {
            streams: registry.iter().map(CatalogEntry::discover).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::catalog(format!("Invalid catalog: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|s| s.tap_stream_id == tap_stream_id)
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl CatalogEntry {
    /// Discovery entry for a stream
    pub fn discover(stream: &StreamDefinition) -> Self {
        let mut stream_metadata = json!({
            "inclusion": "available",
            "selected-by-default": true,
            "table-key-properties": stream.primary_keys,
            "forced-replication-method": stream.replication_method(),
        });
        if let Some(key) = &stream.replication_key {
            stream_metadata["valid-replication-keys"] = json!([key]);
        }
        if let Some(parent) = &stream.parent {
            stream_metadata["parent-tap-stream-id"] = json!(parent);
        }

        let mut metadata = vec![MetadataEntry {
            breadcrumb: Vec::new(),
            metadata: stream_metadata.as_object().cloned().unwrap_or_default(),
        }];

        metadata.extend(stream.schema.property_names().map(|name| {
            let inclusion = if stream.is_automatic(name) {
                "automatic"
            } else {
                "available"
            };
            MetadataEntry {
                breadcrumb: vec!["properties".to_string(), name.to_string()],
                metadata: json!({ "inclusion": inclusion })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            }
        }));

        Self {
            tap_stream_id: stream.name.clone(),
            stream: stream.name.clone(),
            schema: stream.schema.to_json(),
            key_properties: stream.primary_keys.clone(),
            replication_method: stream.replication_method(),
            replication_key: stream.replication_key.clone(),
            metadata,
        }
    }

    /// Stream-level (`[]`) metadata
    pub fn stream_metadata(&self) -> Option<&MetadataEntry> {
        self.metadata.iter().find(|m| m.is_stream_level())
    }

    /// Whether the stream is selected
    pub fn is_selected(&self) -> bool {
        let Some(md) = self.stream_metadata() else {
            return false;
        };
        if md.inclusion() == Some("unsupported") {
            return false;
        }
        md.selected()
            .unwrap_or_else(|| md.selected_by_default().unwrap_or(false))
    }

    /// Properties explicitly turned off
    pub fn deselected_properties(&self) -> Vec<&str> {
        self.metadata
            .iter()
            .filter_map(|md| {
                let name = md.property()?;
                if md.inclusion() == Some("automatic") {
                    return None;
                }
                let off = md.inclusion() == Some("unsupported")
                    || md.selected() == Some(false)
                    || (md.selected().is_none() && md.selected_by_default() == Some(false));
                off.then_some(name)
            })
            .collect()
    }
}
