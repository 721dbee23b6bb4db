//! JSON record decoder

use crate::error::{Error, Result};
use serde_json::Value;

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode a raw response body into records
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
        self.extract(&value)
    }

    /// Extract records from an already parsed body
    fn extract(&self, value: &Value) -> Result<Vec<Value>>;
}

/// JSON decoder with a records path
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    records_path: String,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::with_path("$")
    }
}

impl JsonDecoder {
    /// Decoder treating the whole body as the record(s)
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder extracting records at `path`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            records_path: path.into(),
        }
    }

    /// The configured records path
    pub fn records_path(&self) -> &str {
        &self.records_path
    }
}

impl RecordDecoder for JsonDecoder {
    fn extract(&self, value: &Value) -> Result<Vec<Value>> {
        let path = self.records_path.trim();

        if path.is_empty() || path == "$" {
            return Ok(flatten(value.clone()));
        }

        if is_simple_path(path) {
            Ok(extract_simple_path(value, path).map(flatten).unwrap_or_default())
        } else {
            extract_with_jsonpath(value, path)
        }
    }
}

/// Arrays become their elements; null becomes nothing
fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::Array(arr) => arr,
        Value::Null => vec![],
        other => vec![other],
    }
}

/// Dot-separated keys, with an optional index or `[*]` on the last segment
fn is_simple_path(path: &str) -> bool {
    if path.contains("..") || path.contains('?') || path.contains('@') {
        return false;
    }
    let body = path.strip_prefix("$.").unwrap_or(path);
    let segments: Vec<&str> = body.split('.').collect();
    let last = segments.len() - 1;

    segments.iter().enumerate().all(|(i, segment)| {
        if segment.contains('*') {
            i == last && segment.ends_with("[*]")
        } else {
            !segment.is_empty()
        }
    })
}

/// Walk a simple path (`a.b[0]`, `a.b[-1]`, `a.b[*]`)
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        let Some(bracket_pos) = part.find('[') else {
            current = current.get(part)?;
            continue;
        };

        let name = &part[..bracket_pos];
        let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

        if !name.is_empty() {
            current = current.get(name)?;
        }

        if index_str == "*" {
            return Some(current.clone());
        }

        let index: i64 = index_str.parse().ok()?;
        let arr = current.as_array()?;
        #[allow(clippy::cast_possible_wrap)]
        let idx = if index < 0 {
            arr.len() as i64 + index
        } else {
            index
        };
        current = arr.get(usize::try_from(idx).ok()?)?;
    }

    Some(current.clone())
}

/// Evaluate a full JSONPath expression
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
