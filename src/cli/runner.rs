//! CLI runner - executes commands

use crate::catalog::{Catalog, Selection};
use crate::cli::commands::{AboutFormat, Cli, TestMode};
use crate::config::{ConfigLoader, ConfigSource, TapConfig};
use crate::connector::{Connector, SyncRequest};
use crate::engine::SyncConfig;
use crate::error::{Error, Result, ResultExt};
use crate::singer::{Message, MessageWriter, OutputMode};
use crate::state::StateManager;
use crate::tap::ContentQuoTap;
use std::io::{self, Write};
use tracing::info;

/// CLI runner
#[derive(Debug)]
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run against stdout
    pub async fn run(self) -> Result<()> {
        self.run_with(io::stdout()).await
    }

    /// Run, writing all command output to `out`
    pub async fn run_with<W>(self, mut out: W) -> Result<()>
    where
        W: Write + Send + 'static,
    {
        if self.cli.about {
            return self.about(&mut out);
        }
        if self.cli.discover {
            return self.discover(&mut out);
        }

        let config = self.load_config()?;
        let tap = ContentQuoTap::with_config(config);

        match self.cli.test {
            Some(TestMode::All) => self.test_connection(&tap).await,
            Some(TestMode::Schema) => self.write_schemas(&tap, out),
            None => self.sync(&tap, out).await,
        }
    }

    fn about(&self, out: &mut impl Write) -> Result<()> {
        let about = ContentQuoTap::new().about();
        match self.cli.format {
            AboutFormat::Json => {
                writeln!(out, "{}", serde_json::to_string_pretty(&about)?)?;
            }
            AboutFormat::Markdown => {
                write!(out, "{}", about.to_markdown())?;
            }
        }
        Ok(())
    }

    fn discover(&self, out: &mut impl Write) -> Result<()> {
        let catalog = ContentQuoTap::new().discover();
        writeln!(out, "{}", serde_json::to_string_pretty(&catalog)?)?;
        info!(streams = catalog.streams.len(), "Catalog discovery complete");
        Ok(())
    }

    /// Merge `--config` sources; no `--config` at all means `ENV`
    fn load_config(&self) -> Result<TapConfig> {
        let sources: Vec<ConfigSource> = self
            .cli
            .config
            .iter()
            .map(|arg| ConfigSource::parse(arg))
            .collect();
        ConfigLoader::from_sources(&sources)?.load()
    }

    fn load_state(&self) -> Result<StateManager> {
        match &self.cli.state {
            Some(path) => StateManager::from_file(path)
                .with_context(|| format!("Failed to load state from {}", path.display())),
            None => Ok(StateManager::in_memory()),
        }
    }

    fn load_selection(&self, tap: &ContentQuoTap) -> Result<Selection> {
        match &self.cli.catalog {
            Some(path) => {
                let catalog = Catalog::from_file(path)
                    .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
                Ok(Selection::from_catalog(&catalog, tap.registry()))
            }
            None => Ok(Selection::all(tap.registry())),
        }
    }

    async fn test_connection(&self, tap: &ContentQuoTap) -> Result<()> {
        let result = tap.test_connection().await?;
        if result.success {
            Ok(())
        } else {
            Err(Error::ConnectionTest {
                message: result.message.unwrap_or_default(),
            })
        }
    }

    fn write_schemas<W>(&self, tap: &ContentQuoTap, out: W) -> Result<()>
    where
        W: Write + Send + 'static,
    {
        let selection = self.load_selection(tap)?;
        let mut writer = MessageWriter::new(out).with_mode(OutputMode::SchemaOnly);

        for stream in tap.registry().iter() {
            if selection.is_selected(&stream.name) {
                writer.write(&Message::schema(
                    stream.name.as_str(),
                    &stream.schema,
                    &stream.primary_keys,
                    stream.replication_key.as_deref(),
                ))?;
            }
        }
        writer.flush()
    }

    async fn sync<W>(&self, tap: &ContentQuoTap, out: W) -> Result<()>
    where
        W: Write + Send + 'static,
    {
        let request = SyncRequest {
            selection: self.load_selection(tap)?,
            state: self.load_state()?,
            writer: MessageWriter::new(out),
            config: SyncConfig::default(),
        };

        let stats = tap.sync(request).await?;
        info!(
            records = stats.records_synced,
            duration_ms = stats.duration_ms,
            "Tap finished"
        );
        Ok(())
    }
}
