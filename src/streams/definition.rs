//! Stream definition type

use crate::decode::JsonDecoder;
use crate::error::Result;
use crate::pagination::{HeaderPaginator, NoPaginator, Paginator};
use crate::schema::JsonSchema;
use crate::template;
use crate::types::{Context, JsonValue, ReplicationMethod};
use tracing::warn;

/// How a stream pages through results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationKind {
    /// `X-Next-Page` response header, sent back as `page`
    #[default]
    Header,
    /// Single request
    None,
}

/// Declarative description of one stream
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    /// Stream name (also the `tap_stream_id`)
    pub name: String,
    /// Request path, may contain `{name}` placeholders
    pub path: String,
    /// Primary key fields
    pub primary_keys: Vec<String>,
    /// JSONPath locating records in a response
    pub records_path: String,
    /// Field tracked as the incremental bookmark
    pub replication_key: Option<String>,
    /// Query parameter carrying the starting bookmark
    pub replication_param: Option<String>,
    /// Declared record schema
    pub schema: JsonSchema,
    /// Parent stream name
    pub parent: Option<String>,
    /// Record fields handed to child streams as context
    pub child_context_keys: Vec<String>,
    /// Treat a 404 as "nothing here" for a context
    pub skip_not_found: bool,
    /// Pagination strategy
    pub pagination: PaginationKind,
}

impl StreamDefinition {
    /// Create a top-level stream with a `$` records path
    pub fn new(name: impl Into<String>, path: impl Into<String>, schema: JsonSchema) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            primary_keys: Vec::new(),
            records_path: "$".to_string(),
            replication_key: None,
            replication_param: None,
            schema,
            parent: None,
            child_context_keys: Vec::new(),
            skip_not_found: false,
            pagination: PaginationKind::default(),
        }
    }

    #[must_use]
    pub fn with_primary_keys(mut self, keys: &[&str]) -> Self {
        self.primary_keys = keys.iter().map(|k| (*k).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into();
        self
    }

    #[must_use]
    pub fn with_replication_key(mut self, key: impl Into<String>) -> Self {
        self.replication_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_replication_param(mut self, param: impl Into<String>) -> Self {
        self.replication_param = Some(param.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_child_context(mut self, keys: &[&str]) -> Self {
        self.child_context_keys = keys.iter().map(|k| (*k).to_string()).collect();
        self
    }

    #[must_use]
    pub fn skip_not_found(mut self) -> Self {
        self.skip_not_found = true;
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationKind) -> Self {
        self.pagination = pagination;
        self
    }

    /// Replication method advertised in the catalog
    pub fn replication_method(&self) -> ReplicationMethod {
        if self.replication_key.is_some() {
            ReplicationMethod::Incremental
        } else {
            ReplicationMethod::FullTable
        }
    }

    /// Whether a property is a key that cannot be deselected
    pub fn is_automatic(&self, property: &str) -> bool {
        self.primary_keys.iter().any(|k| k == property)
            || self.replication_key.as_deref() == Some(property)
    }

    /// Render the request path for a context
    pub fn render_path(&self, context: Option<&Context>) -> Result<String> {
        template::render(&self.path, context)
    }

    pub fn decoder(&self) -> JsonDecoder {
        JsonDecoder::with_path(self.records_path.as_str())
    }

    pub fn paginator(&self) -> Box<dyn Paginator> {
        match self.pagination {
            PaginationKind::Header => Box::new(HeaderPaginator::default()),
            PaginationKind::None => Box::new(NoPaginator),
        }
    }

    /// Merge the parent context into a record
    ///
    /// Context values overwrite fields of the same name.
    pub fn post_process(&self, record: JsonValue, context: Option<&Context>) -> JsonValue {
        match (record, context) {
            (JsonValue::Object(mut obj), Some(ctx)) => {
                for (key, value) in ctx {
                    obj.insert(key.clone(), value.clone());
                }
                JsonValue::Object(obj)
            }
            (record, _) => record,
        }
    }

    /// Build the context handed to child streams
    ///
    /// Returns `None` (and logs) when the record lacks one of the keys.
    pub fn child_context(&self, record: &JsonValue) -> Option<Context> {
        if self.child_context_keys.is_empty() {
            return None;
        }

        let mut context = Context::new();
        for key in &self.child_context_keys {
            match record.get(key) {
                Some(value) if !value.is_null() => {
                    context.insert(key.clone(), value.clone());
                }
                _ => {
                    warn!(
                        stream = %self.name,
                        field = %key,
                        "Record has no '{}' field, skipping child streams", key
                    );
                    return None;
                }
            }
        }
        Some(context)
    }
}
