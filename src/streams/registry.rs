//! Stream registry

use super::contentquo;
use super::definition::StreamDefinition;
use crate::error::{Error, Result};
use crate::template;

/// Ordered set of stream definitions
#[derive(Debug, Clone, Default)]
pub struct StreamRegistry {
    streams: Vec<StreamDefinition>,
}

impl StreamRegistry {
    /// Build a registry, checking that every parent is defined earlier and
    /// provides the context its children's paths need
    pub fn new(streams: Vec<StreamDefinition>) -> Result<Self> {
        for (i, stream) in streams.iter().enumerate() {
            if streams[..i].iter().any(|s| s.name == stream.name) {
                return Err(Error::config(format!(
                    "Duplicate stream '{}'",
                    stream.name
                )));
            }
            match &stream.parent {
                Some(parent) => {
                    let Some(parent_def) = streams[..i].iter().find(|s| &s.name == parent) else {
                        return Err(Error::config(format!(
                            "Stream '{}' references unknown parent '{}'",
                            stream.name, parent
                        )));
                    };
                    let unresolved: Vec<String> = template::extract_variables(&stream.path)
                        .into_iter()
                        .filter(|v| !parent_def.child_context_keys.contains(v))
                        .collect();
                    if !unresolved.is_empty() {
                        return Err(Error::config(format!(
                            "Stream '{}' path uses {} which '{}' does not provide",
                            stream.name,
                            unresolved.join(", "),
                            parent
                        )));
                    }
                }
                None if template::has_placeholders(&stream.path) => {
                    return Err(Error::config(format!(
                        "Top-level stream '{}' has placeholders in its path",
                        stream.name
                    )));
                }
                None => {}
            }
        }
        Ok(Self { streams })
    }

    /// The ContentQuo streams
    pub fn contentquo() -> Self {
        Self {
            streams: contentquo::streams(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&StreamDefinition> {
        self.streams.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Streams without a parent, in definition order
    pub fn top_level(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter().filter(|s| s.parent.is_none())
    }

    /// Direct children of a stream, in definition order
    pub fn children(&self, name: &str) -> Vec<&StreamDefinition> {
        self.streams
            .iter()
            .filter(|s| s.parent.as_deref() == Some(name))
            .collect()
    }

    /// Names of every stream below `name`
    pub fn descendants(&self, name: &str) -> Vec<&str> {
        let mut found = Vec::new();
        for child in self.children(name) {
            found.push(child.name.as_str());
            found.extend(self.descendants(&child.name));
        }
        found
    }

    /// Names of every stream above `name`, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut found = Vec::new();
        let mut current = self.get(name).and_then(|s| s.parent.as_deref());
        while let Some(parent) = current {
            found.push(parent);
            current = self.get(parent).and_then(|s| s.parent.as_deref());
        }
        found
    }
}
