//! Engine types
//!
//! Configuration and statistics for a sync run.

use crate::singer::OutputMode;

/// Configuration for sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Records read per stream before it stops (0 = unlimited)
    pub max_records_per_stream: usize,
    /// Which messages reach the output
    pub output_mode: OutputMode,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max records per stream
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records_per_stream = max;
        self
    }

    /// Set output mode
    #[must_use]
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records written
    pub records_synced: usize,
    /// Pages fetched
    pub pages_fetched: usize,
    /// Top-level streams completed
    pub streams_synced: usize,
    /// Child stream contexts completed
    pub partitions_synced: usize,
    /// Child stream contexts skipped on 404
    pub contexts_skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self) {
        self.records_synced += 1;
    }

    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    pub fn add_partition(&mut self) {
        self.partitions_synced += 1;
    }

    pub fn add_skipped(&mut self) {
        self.contexts_skipped += 1;
    }

    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
