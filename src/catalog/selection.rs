//! Stream and property selection

use super::types::Catalog;
use crate::streams::StreamRegistry;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Selection state of one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSelection {
    pub selected: bool,
    pub deselected_properties: HashSet<String>,
}

/// Which streams emit records, and which of their properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    streams: HashMap<String, StreamSelection>,
}

impl Selection {
    /// Every stream, every property
    pub fn all(registry: &StreamRegistry) -> Self {
        Self {
            streams: registry
                .iter()
                .map(|s| {
                    (
                        s.name.clone(),
                        StreamSelection {
                            selected: true,
                            deselected_properties: HashSet::new(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Selection from a `--catalog` file
    pub fn from_catalog(catalog: &Catalog, registry: &StreamRegistry) -> Self {
        let mut streams = HashMap::new();

        for entry in &catalog.streams {
            let Some(definition) = registry.get(&entry.tap_stream_id) else {
                warn!(stream = %entry.tap_stream_id, "Catalog stream is unknown, ignoring");
                continue;
            };

            let deselected_properties = entry
                .deselected_properties()
                .into_iter()
                .filter(|name| !definition.is_automatic(name))
                .map(str::to_string)
                .collect();

            streams.insert(
                definition.name.clone(),
                StreamSelection {
                    selected: entry.is_selected(),
                    deselected_properties,
                },
            );
        }

        Self { streams }
    }

    /// Whether the stream's records are emitted
    pub fn is_selected(&self, stream: &str) -> bool {
        self.streams.get(stream).is_some_and(|s| s.selected)
    }

    /// Whether the stream must be requested at all
    pub fn should_sync(&self, stream: &str, registry: &StreamRegistry) -> bool {
        self.is_selected(stream)
            || registry
                .descendants(stream)
                .into_iter()
                .any(|d| self.is_selected(d))
    }

    /// Properties to strip from the stream's records
    pub fn deselected_properties(&self, stream: &str) -> HashSet<String> {
        self.streams
            .get(stream)
            .map(|s| s.deselected_properties.clone())
            .unwrap_or_default()
    }

    /// Names of selected streams
    pub fn selected_streams(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .streams
            .iter()
            .filter(|(_, s)| s.selected)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
