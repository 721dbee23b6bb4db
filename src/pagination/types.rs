//! Pagination types and traits

use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use std::collections::{BTreeMap, HashSet};

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Another page exists, requested with this token
    Continue {
        /// Opaque page token
        token: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Continue with a token, or stop when the token is empty
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::Continue { token },
            _ => Self::Done,
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Strategy for walking the pages of one endpoint
pub trait Paginator: Send + Sync {
    /// Inspect response headers and decide whether another page follows
    fn next_page(&self, headers: &HeaderMap) -> NextPage;

    /// Query parameters that request the page for `token`
    fn page_params(&self, token: &str) -> BTreeMap<String, String>;
}

/// Progress through the pages of one stream/context
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Token for the page about to be requested
    pub token: Option<String>,
    /// Pages fetched so far
    pub pages: usize,
    seen: HashSet<String>,
}

impl PaginationState {
    /// Create a fresh state (first page)
    pub fn new() -> Self {
        Self::default()
    }

    /// Query parameters for the next request
    pub fn params(&self, paginator: &dyn Paginator) -> BTreeMap<String, String> {
        self.token
            .as_deref()
            .map(|token| paginator.page_params(token))
            .unwrap_or_default()
    }

    /// Record a fetched page; returns whether to keep going
    pub fn advance(&mut self, stream: &str, next: NextPage) -> Result<bool> {
        self.pages += 1;
        match next {
            NextPage::Done => {
                self.token = None;
                Ok(false)
            }
            NextPage::Continue { token } => {
                if !self.seen.insert(token.clone()) {
                    return Err(Error::PaginationLoop {
                        stream: stream.to_string(),
                        token,
                    });
                }
                self.token = Some(token);
                Ok(true)
            }
        }
    }
}
