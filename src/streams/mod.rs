//! Stream definitions
//!
//! A stream is one REST endpoint plus the schema of the records it yields.
//! Child streams hang off a parent and run once per parent record, with the
//! parent's context filling the placeholders in their path.
//!
//! # Example
//!
//! ```
//! use tap_contentquo::streams::StreamRegistry;
//!
//! let registry = StreamRegistry::contentquo();
//! let details = registry.get("evaluation_details").unwrap();
//! assert_eq!(details.parent.as_deref(), Some("evaluations"));
//! ```

mod contentquo;
mod definition;
mod registry;

pub use definition::{PaginationKind, StreamDefinition};
pub use registry::StreamRegistry;
