//! Singer-style metrics
//!
//! Metrics are logged as `METRIC: {json}` lines at INFO level under the
//! `tap_contentquo::metrics` target, the format Meltano's log parsers expect.

use crate::types::JsonValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::info;

/// Tracing target all metrics are logged under
pub const METRICS_TARGET: &str = "tap_contentquo::metrics";

/// How often a running counter logs its progress
const COUNTER_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Kind of metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonic count
    Counter,
    /// Elapsed time in seconds
    Timer,
}

/// A single metric point
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub kind: MetricKind,
    pub metric: String,
    pub value: JsonValue,
    pub tags: BTreeMap<String, JsonValue>,
}

impl Metric {
    /// Create a counter point
    pub fn counter(name: impl Into<String>, value: u64) -> Self {
        Self {
            kind: MetricKind::Counter,
            metric: name.into(),
            value: JsonValue::from(value),
            tags: BTreeMap::new(),
        }
    }

    /// Create a timer point
    pub fn timer(name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            kind: MetricKind::Timer,
            metric: name.into(),
            value: JsonValue::from(elapsed.as_secs_f64()),
            tags: BTreeMap::new(),
        }
    }

    /// Attach a tag
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Render as a log line
    pub fn to_line(&self) -> String {
        format!(
            "METRIC: {}",
            serde_json::to_string(self).unwrap_or_default()
        )
    }

    /// Log the metric
    pub fn emit(&self) {
        info!(target: METRICS_TARGET, "{}", self.to_line());
    }
}

/// Times an operation and logs a timer metric when stopped
#[derive(Debug)]
pub struct Timer {
    metric: Metric,
    start: Instant,
}

impl Timer {
    /// Start timing
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            metric: Metric::timer(name, Duration::ZERO),
            start: Instant::now(),
        }
    }

    /// Attach a tag
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metric = self.metric.with_tag(key, value);
        self
    }

    /// Stop the timer, log it, and return the metric
    pub fn stop(self) -> Metric {
        let metric = Metric {
            value: JsonValue::from(self.start.elapsed().as_secs_f64()),
            ..self.metric
        };
        metric.emit();
        metric
    }
}

/// Counts records for one stream, logging periodically and on finish
#[derive(Debug)]
pub struct RecordCounter {
    stream: String,
    context: Option<JsonValue>,
    count: u64,
    last_log: Instant,
}

impl RecordCounter {
    /// Create a counter for a stream
    pub fn new(stream: impl Into<String>, context: Option<JsonValue>) -> Self {
        Self {
            stream: stream.into(),
            context,
            count: 0,
            last_log: Instant::now(),
        }
    }

    /// Count one record
    pub fn increment(&mut self) {
        self.count += 1;
        if self.last_log.elapsed() >= COUNTER_LOG_INTERVAL {
            self.metric().emit();
            self.last_log = Instant::now();
        }
    }

    /// Current count
    pub fn count(&self) -> u64 {
        self.count
    }

    fn metric(&self) -> Metric {
        let metric = Metric::counter("record_count", self.count).with_tag("stream", self.stream.as_str());
        match &self.context {
            Some(context) => metric.with_tag("context", context.clone()),
            None => metric,
        }
    }

    /// Log the final count
    pub fn finish(self) -> u64 {
        self.metric().emit();
        self.count
    }
}
