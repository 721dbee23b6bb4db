//! State management module
//!
//! Singer bookmarks. State comes in through `--state` and goes out as
//! `STATE` messages after each stream or partition.
//!
//! # Layout
//!
//! ```json
//! {"bookmarks": {
//!   "evaluation_details": {"partitions": [{"context": {"eid": "e1"}}]},
//!   "changes": {"replication_key": "updated", "replication_key_value": "2024-05-01"}
//! }}
//! ```
//!
//! Unknown keys and unknown streams survive a load/snapshot cycle.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{PartitionBookmark, State, StreamBookmark};
