//! Record conformance
//!
//! Applied to every record before it is written, after post-processing.

use super::types::JsonSchema;
use crate::types::JsonValue;
use std::collections::HashSet;

/// A record after conformance
#[derive(Debug, Clone, PartialEq)]
pub struct Conformed {
    /// The conformed record
    pub record: JsonValue,
    /// Names of undeclared properties that were dropped
    pub dropped: Vec<String>,
}

/// Drop undeclared top-level properties when the schema is closed
///
/// Non-object records pass through untouched.
pub fn conform_record(record: JsonValue, schema: &JsonSchema) -> Conformed {
    if schema.additional_properties {
        return Conformed {
            record,
            dropped: Vec::new(),
        };
    }

    let JsonValue::Object(mut obj) = record else {
        return Conformed {
            record,
            dropped: Vec::new(),
        };
    };

    let mut dropped: Vec<String> = obj
        .keys()
        .filter(|key| !schema.has_property(key))
        .cloned()
        .collect();
    dropped.sort();

    for key in &dropped {
        obj.remove(key);
    }

    Conformed {
        record: JsonValue::Object(obj),
        dropped,
    }
}

/// Remove deselected top-level properties
pub fn select_properties(record: JsonValue, deselected: &HashSet<String>) -> JsonValue {
    if deselected.is_empty() {
        return record;
    }
    match record {
        JsonValue::Object(mut obj) => {
            obj.retain(|key, _| !deselected.contains(key));
            JsonValue::Object(obj)
        }
        other => other,
    }
}
