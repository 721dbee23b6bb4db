//! The ContentQuo tap

use crate::auth::AuthConfig;
use crate::catalog::{Catalog, Selection};
use crate::config::{settings_schema, TapConfig};
use crate::connector::{AboutInfo, CheckResult, Connector, SyncRequest};
use crate::engine::{SyncConfig, SyncEngine, SyncStats};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::singer::{MessageWriter, OutputMode};
use crate::state::StateManager;
use crate::streams::StreamRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Capabilities advertised by `--about`
pub const CAPABILITIES: &[&str] = &["catalog", "state", "discover", "about"];

/// Singer tap for the ContentQuo REST API
#[derive(Debug, Clone)]
pub struct ContentQuoTap {
    config: Option<TapConfig>,
    registry: Arc<StreamRegistry>,
}

impl Default for ContentQuoTap {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentQuoTap {
    /// Tap without credentials; enough for `--about` and `--discover`
    pub fn new() -> Self {
        Self {
            config: None,
            registry: Arc::new(StreamRegistry::contentquo()),
        }
    }

    /// Tap ready to talk to the API
    pub fn with_config(config: TapConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::new()
        }
    }

    pub fn config(&self) -> Option<&TapConfig> {
        self.config.as_ref()
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    /// Authenticated HTTP client for the configured API
    pub fn http_client(&self) -> Result<HttpClient> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| Error::config("a valid configuration is required to call the API"))?;
        HttpClient::with_auth(
            HttpClientConfig::from_tap_config(config),
            AuthConfig::contentquo(config),
        )
    }

    fn engine(&self, state: StateManager, writer: MessageWriter, config: SyncConfig) -> Result<SyncEngine> {
        Ok(SyncEngine::new(self.http_client()?, Arc::clone(&self.registry), state, writer)
            .with_config(config))
    }
}

#[async_trait]
impl Connector for ContentQuoTap {
    fn about(&self) -> AboutInfo {
        AboutInfo {
            name: crate::NAME.to_string(),
            description: "Singer tap for the ContentQuo REST API".to_string(),
            version: crate::VERSION.to_string(),
            capabilities: CAPABILITIES.iter().map(|c| (*c).to_string()).collect(),
            settings: settings_schema(),
        }
    }

    fn discover(&self) -> Catalog {
        Catalog::discover(&self.registry)
    }

    async fn test_connection(&self) -> Result<CheckResult> {
        let config = SyncConfig::new()
            .with_max_records(1)
            .with_output_mode(OutputMode::Nothing);
        let mut engine = self.engine(
            StateManager::in_memory(),
            MessageWriter::new(std::io::sink()),
            config,
        )?;

        match engine.sync(&Selection::all(&self.registry)).await {
            Ok(stats) => {
                info!(pages = stats.pages_fetched, "Connection test passed");
                Ok(CheckResult::success())
            }
            Err(e) => {
                warn!(error = %e, "Connection test failed");
                Ok(CheckResult::failure(e.to_string()))
            }
        }
    }

    async fn sync(&self, request: SyncRequest) -> Result<SyncStats> {
        let SyncRequest {
            selection,
            state,
            writer,
            config,
        } = request;

        let selected = selection.selected_streams();
        if selected.is_empty() {
            warn!("No streams selected");
        } else {
            info!(streams = ?selected, "Starting sync");
        }

        let mut engine = self.engine(state, writer, config)?;
        engine.sync(&selection).await
    }
}
