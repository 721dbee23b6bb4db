// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-contentquo
//!
//! A Singer tap for the ContentQuo REST API. It reads evaluations, their
//! details, issues, metadata and metrics, plus users, and writes `SCHEMA`,
//! `RECORD` and `STATE` messages as JSON lines on stdout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tap_contentquo::catalog::Selection;
//! use tap_contentquo::config::TapConfig;
//! use tap_contentquo::connector::{Connector, SyncRequest};
//! use tap_contentquo::engine::SyncConfig;
//! use tap_contentquo::singer::MessageWriter;
//! use tap_contentquo::state::StateManager;
//! use tap_contentquo::tap::ContentQuoTap;
//!
//! # async fn run() -> tap_contentquo::Result<()> {
//! let config = TapConfig::new("https://api.contentquo.com/v1", "key", "secret");
//! let tap = ContentQuoTap::with_config(config);
//!
//! let stats = tap
//!     .sync(SyncRequest {
//!         selection: Selection::all(tap.registry()),
//!         state: StateManager::in_memory(),
//!         writer: MessageWriter::stdout(),
//!         config: SyncConfig::default(),
//!     })
//!     .await?;
//! println!("{} records", stats.records_synced);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Connector Interface                       │
//! │  about() → AboutInfo   discover() → Catalog   test_connection() │
//! │  sync(selection, state, writer) → SyncStats                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Streams  │   Singer    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Session  │ GET       │ X-Next-Page   │ Parent    │ SCHEMA      │
//! │ token    │ Retry     │ header        │ Child     │ RECORD      │
//! │ re-login │ Rate Limit│               │ Context   │ STATE       │
//! │ on 401   │ Backoff   │               │ Conform   │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Settings, config files and environment variables
pub mod config;

/// Logging setup
pub mod logging;

/// Singer-style metrics
pub mod metrics;

/// Session authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response decoders
pub mod decode;

/// Declared stream schemas
pub mod schema;

/// Path templates
pub mod template;

/// Stream definitions
pub mod streams;

/// Catalog discovery and selection
pub mod catalog;

/// Bookmarks
pub mod state;

/// Singer message output
pub mod singer;

/// Main execution engine
pub mod engine;

/// Connector trait
pub mod connector;

/// The ContentQuo tap
pub mod tap;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use tap::ContentQuoTap;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
