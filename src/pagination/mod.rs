//! Pagination module
//!
//! Supports: response header token (the default), none
//!
//! Each strategy inspects a response and either yields the token for the
//! next page or reports that the stream is exhausted. `PaginationState`
//! rejects a token it has already seen, so a misbehaving API cannot make a
//! stream loop forever.

mod strategies;
mod types;

pub use strategies::{HeaderPaginator, NoPaginator};
pub use types::{NextPage, PaginationState, Paginator};
