//! Execution engine module
//!
//! Walks the stream tree and turns API responses into Singer messages.
//!
//! # Overview
//!
//! - Top-level streams run in definition order
//! - After each parent record is written, its child streams run for the
//!   context that record yields
//! - `SCHEMA` precedes the first `RECORD` of a stream
//! - `STATE` follows every completed stream or partition, and closes the run

mod types;

pub use types::{SyncConfig, SyncStats};

use crate::catalog::Selection;
use crate::decode::RecordDecoder;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::metrics::RecordCounter;
use crate::pagination::PaginationState;
use crate::schema::{conform_record, select_properties};
use crate::singer::{Message, MessageWriter};
use crate::state::StateManager;
use crate::streams::{StreamDefinition, StreamRegistry};
use crate::types::{scalar_to_string, Context, JsonValue};
use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    client: HttpClient,
    registry: Arc<StreamRegistry>,
    state: StateManager,
    writer: MessageWriter,
    config: SyncConfig,
    stats: SyncStats,
    /// Streams whose SCHEMA has been written
    schemas_sent: HashSet<String>,
    /// Streams already warned about dropped properties
    conform_warned: HashSet<String>,
    /// Records read per stream, across partitions
    records_read: HashMap<String, usize>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("streams", &self.registry.names())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Outcome of reading one stream for one context
enum StreamRun {
    Completed,
    NotFound,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        client: HttpClient,
        registry: Arc<StreamRegistry>,
        state: StateManager,
        writer: MessageWriter,
    ) -> Self {
        Self {
            client,
            registry,
            state,
            writer,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
            schemas_sent: HashSet::new(),
            conform_warned: HashSet::new(),
            records_read: HashMap::new(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.writer = self.writer.with_mode(config.output_mode);
        self.config = config;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync every stream the selection needs
    pub async fn sync(&mut self, selection: &Selection) -> Result<SyncStats> {
        let start = Instant::now();
        let registry = Arc::clone(&self.registry);

        for stream in registry.top_level() {
            if !selection.should_sync(&stream.name, &registry) {
                debug!(stream = %stream.name, "Stream not selected, skipping");
                continue;
            }
            self.sync_stream(&stream.name, None, selection).await?;
        }

        self.emit_state().await?;
        self.writer.flush()?;

        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            records = self.stats.records_synced,
            pages = self.stats.pages_fetched,
            partitions = self.stats.partitions_synced,
            skipped = self.stats.contexts_skipped,
            duration_ms = self.stats.duration_ms,
            "Sync completed"
        );

        Ok(self.stats.clone())
    }

    /// Sync one stream for one context, then its children per record
    fn sync_stream<'a>(
        &'a mut self,
        name: &'a str,
        context: Option<&'a Context>,
        selection: &'a Selection,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let registry = Arc::clone(&self.registry);
            let stream = registry.get(name).ok_or_else(|| Error::StreamNotFound {
                stream: name.to_string(),
            })?;

            let selected = selection.is_selected(name);
            if selected {
                self.emit_schema(stream)?;
            }

            let context_value = context.map(|c| JsonValue::Object(c.clone()));
            match &context_value {
                Some(ctx) => info!(stream = %name, context = %ctx, "Beginning sync of '{name}'"),
                None => info!(stream = %name, "Beginning sync of '{name}'"),
            }

            let mut counter = RecordCounter::new(name, context_value.clone());
            let run = self
                .read_records(stream, context, selection, &registry, &mut counter)
                .await?;
            counter.finish();

            if matches!(run, StreamRun::NotFound) {
                warn!(
                    stream = %name,
                    context = %context_value.unwrap_or_default(),
                    "{name} not found for context. Skipping."
                );
                self.stats.add_skipped();
                return Ok(());
            }

            match context {
                Some(ctx) => {
                    self.state.record_partition(name, ctx).await;
                    self.stats.add_partition();
                }
                None => {
                    self.state.touch_stream(name).await;
                    self.stats.add_stream();
                }
            }
            self.emit_state().await
        }
        .boxed()
    }

    /// Page through one stream/context, writing records as they come
    async fn read_records(
        &mut self,
        stream: &StreamDefinition,
        context: Option<&Context>,
        selection: &Selection,
        registry: &StreamRegistry,
        counter: &mut RecordCounter,
    ) -> Result<StreamRun> {
        let name = stream.name.as_str();
        if self.limit_reached(name) {
            return Ok(StreamRun::Completed);
        }
        let selected = selection.is_selected(name);
        let deselected = selection.deselected_properties(name);
        let path = stream.render_path(context)?;
        let decoder = stream.decoder();
        let paginator = stream.paginator();
        let mut pagination = PaginationState::new();

        let starting_value = match (&stream.replication_key, &stream.replication_param) {
            (Some(_), Some(_)) => self.state.replication_value(name, context).await,
            _ => None,
        };

        loop {
            let mut request = RequestConfig::new()
                .tag("endpoint", stream.path.as_str())
                .tag("stream", name);
            for (key, value) in pagination.params(paginator.as_ref()) {
                request = request.query(key, value);
            }
            if let (Some(param), Some(value)) = (
                &stream.replication_param,
                starting_value.as_ref().and_then(scalar_to_string),
            ) {
                request = request.query(param.as_str(), value);
            }

            let response = match self.client.get_with_config(&path, request).await {
                Ok(response) => response,
                Err(e) if e.is_not_found() && stream.skip_not_found => {
                    return Ok(StreamRun::NotFound);
                }
                Err(e) => return Err(e),
            };

            let headers = response.headers().clone();
            let body = response
                .text()
                .await
                .map_err(|e| Error::decode(format!("Failed to read response body: {e}")))?;
            self.stats.add_page();

            let records = decoder.decode(&body)?;
            debug!(stream = %name, page = pagination.pages + 1, records = records.len(), "Fetched page");

            for record in records {
                if self.limit_reached(name) {
                    info!(stream = %name, "Record limit reached");
                    return Ok(StreamRun::Completed);
                }
                *self.records_read.entry(name.to_string()).or_default() += 1;

                let record = stream.post_process(record, context);

                if let Some(key) = &stream.replication_key {
                    if let Some(value) = record.get(key) {
                        self.state
                            .update_replication_value(name, context, key, value)
                            .await;
                    }
                }

                let child_context = stream.child_context(&record);

                if selected {
                    self.write_record(stream, record, &deselected)?;
                    counter.increment();
                }

                if let Some(child_context) = child_context {
                    for child in registry.children(name) {
                        if selection.should_sync(&child.name, registry) {
                            self.sync_stream(&child.name, Some(&child_context), selection)
                                .await?;
                        }
                    }
                }
            }

            if self.limit_reached(name) {
                break;
            }
            let next = paginator.next_page(&headers);
            if !pagination.advance(name, next)? {
                break;
            }
        }

        Ok(StreamRun::Completed)
    }

    fn limit_reached(&self, stream: &str) -> bool {
        let max = self.config.max_records_per_stream;
        max > 0 && self.records_read.get(stream).copied().unwrap_or(0) >= max
    }

    fn write_record(
        &mut self,
        stream: &StreamDefinition,
        record: JsonValue,
        deselected: &HashSet<String>,
    ) -> Result<()> {
        let conformed = conform_record(record, &stream.schema);
        if !conformed.dropped.is_empty() && self.conform_warned.insert(stream.name.clone()) {
            warn!(
                stream = %stream.name,
                "Properties {:?} were present in the '{}' stream but not found in catalog schema. Ignoring.",
                conformed.dropped,
                stream.name
            );
        }

        let record = select_properties(conformed.record, deselected);
        self.writer.write(&Message::record(stream.name.as_str(), record))?;
        self.stats.add_record();
        Ok(())
    }

    fn emit_schema(&mut self, stream: &StreamDefinition) -> Result<()> {
        if !self.schemas_sent.insert(stream.name.clone()) {
            return Ok(());
        }
        self.writer.write(&Message::schema(
            stream.name.as_str(),
            &stream.schema,
            &stream.primary_keys,
            stream.replication_key.as_deref(),
        ))
    }

    async fn emit_state(&mut self) -> Result<()> {
        let value = self.state.snapshot().await;
        self.writer.write(&Message::state(value))
    }
}
