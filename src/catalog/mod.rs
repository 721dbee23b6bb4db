//! Singer catalog
//!
//! Discovery output and the selection read back from `--catalog`.
//!
//! # Selection rules
//!
//! - A stream is selected when its `[]` metadata says `selected: true`, or
//!   says `selected-by-default: true` without an explicit `selected`
//! - Streams missing from the catalog are not selected
//! - Key properties are always kept; other properties can be deselected
//! - A parent runs (without emitting) when any descendant is selected

mod selection;
mod types;

pub use selection::{Selection, StreamSelection};
pub use types::{Catalog, CatalogEntry, MetadataEntry};

#[cfg(test)]
mod tests;
