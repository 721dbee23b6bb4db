//! Stream schemas
//!
//! Declared JSON Schemas for the tap's streams and the record conformance
//! applied before records are written.
//!
//! # Features
//!
//! - **Property builder**: nullable-by-default typed properties
//! - **Nested objects and arrays**: declared recursively
//! - **Conformance**: undeclared properties dropped from closed schemas
//! - **Property selection**: deselected catalog properties removed

mod conform;
mod types;

pub use conform::{conform_record, select_properties, Conformed};
pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
