//! State manager implementation

use super::types::{advance, State};
use crate::error::{Error, Result};
use crate::types::{Context, JsonValue};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle on the sync state
#[derive(Debug, Clone, Default)]
pub struct StateManager {
    state: Arc<RwLock<State>>,
}

impl StateManager {
    /// Start from empty state
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Start from an existing state
    pub fn with_state(state: State) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Load a `--state` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
            message: format!("Failed to read state file: {e}"),
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::in_memory());
        }
        Self::from_json(&contents)
    }

    /// Parse inline state JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;
        Ok(Self::with_state(state))
    }

    /// Copy of the current state
    pub async fn state(&self) -> State {
        self.state.read().await.clone()
    }

    /// Current state as the value of a `STATE` message
    pub async fn snapshot(&self) -> JsonValue {
        self.state.read().await.to_json()
    }

    /// Make sure a stream has a bookmark entry
    pub async fn touch_stream(&self, stream: &str) {
        self.state.write().await.bookmark_mut(stream);
    }

    /// Record that a child stream ran for a context
    pub async fn record_partition(&self, stream: &str, context: &Context) {
        self.state
            .write()
            .await
            .bookmark_mut(stream)
            .partition_mut(context);
    }

    /// Starting replication value for a stream or partition
    pub async fn replication_value(
        &self,
        stream: &str,
        context: Option<&Context>,
    ) -> Option<JsonValue> {
        self.state
            .read()
            .await
            .replication_value(stream, context)
            .cloned()
    }

    /// Advance the bookmark to `value` if it is newer
    pub async fn update_replication_value(
        &self,
        stream: &str,
        context: Option<&Context>,
        key: &str,
        value: &JsonValue,
    ) {
        let mut state = self.state.write().await;
        let bookmark = state.bookmark_mut(stream);
        match context {
            Some(ctx) => {
                let partition = bookmark.partition_mut(ctx);
                partition.replication_key = Some(key.to_string());
                advance(&mut partition.replication_key_value, value);
            }
            None => {
                bookmark.replication_key = Some(key.to_string());
                advance(&mut bookmark.replication_key_value, value);
            }
        }
    }
}
