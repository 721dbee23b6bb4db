//! State types

use crate::types::{Context, JsonObject, JsonValue};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Top-level Singer state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamBookmark>,
    /// Keys this tap does not use
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Bookmark for one stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamBookmark {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<PartitionBookmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Bookmark for one parent context of a child stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionBookmark {
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookmark(&self, stream: &str) -> Option<&StreamBookmark> {
        self.bookmarks.get(stream)
    }

    /// Bookmark for a stream, created empty when missing
    pub fn bookmark_mut(&mut self, stream: &str) -> &mut StreamBookmark {
        self.bookmarks.entry(stream.to_string()).or_default()
    }

    /// Replication value stored for a stream or one of its partitions
    pub fn replication_value(&self, stream: &str, context: Option<&Context>) -> Option<&JsonValue> {
        let bookmark = self.bookmark(stream)?;
        match context {
            Some(ctx) => bookmark.partition(ctx)?.replication_key_value.as_ref(),
            None => bookmark.replication_key_value.as_ref(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl StreamBookmark {
    pub fn partition(&self, context: &Context) -> Option<&PartitionBookmark> {
        self.partitions.iter().find(|p| &p.context == context)
    }

    /// Partition for a context, appended when missing
    pub fn partition_mut(&mut self, context: &Context) -> &mut PartitionBookmark {
        let index = match self.partitions.iter().position(|p| &p.context == context) {
            Some(index) => index,
            None => {
                self.partitions.push(PartitionBookmark {
                    context: context.clone(),
                    ..PartitionBookmark::default()
                });
                self.partitions.len() - 1
            }
        };
        &mut self.partitions[index]
    }
}

/// Keep the larger of the stored and the new replication value
pub(super) fn advance(slot: &mut Option<JsonValue>, value: &JsonValue) {
    let replace = match slot.as_ref() {
        None => true,
        Some(current) => compare_values(value, current) == Some(Ordering::Greater),
    };
    if replace && !value.is_null() {
        *slot = Some(value.clone());
    }
}

/// Order two replication values: numbers numerically, RFC 3339 timestamps
/// chronologically, other strings lexically
pub(super) fn compare_values(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (JsonValue::String(x), JsonValue::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(dx), Ok(dy)) => Some(dx.cmp(&dy)),
                _ => Some(x.cmp(y)),
            }
        }
        _ => None,
    }
}
