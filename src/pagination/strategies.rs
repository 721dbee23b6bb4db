//! Pagination strategy implementations

use super::types::{NextPage, Paginator};
use reqwest::header::HeaderMap;
use std::collections::BTreeMap;

/// Header carrying the next page token
pub const DEFAULT_NEXT_PAGE_HEADER: &str = "X-Next-Page";

/// Query parameter the token is sent back in
pub const DEFAULT_PAGE_PARAM: &str = "page";

// ============================================================================
// No Pagination
// ============================================================================

/// Single request, no pagination
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn next_page(&self, _headers: &HeaderMap) -> NextPage {
        NextPage::Done
    }

    fn page_params(&self, _token: &str) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

// ============================================================================
// Header Token
// ============================================================================

/// Next page token taken from a response header
///
/// With no header (or an empty one) the stream is exhausted.
#[derive(Debug, Clone)]
pub struct HeaderPaginator {
    /// Response header name
    pub header: String,
    /// Query parameter for the token
    pub param: String,
}

impl Default for HeaderPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_NEXT_PAGE_HEADER, DEFAULT_PAGE_PARAM)
    }
}

impl HeaderPaginator {
    /// Create a header paginator
    pub fn new(header: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            param: param.into(),
        }
    }
}

impl Paginator for HeaderPaginator {
    fn next_page(&self, headers: &HeaderMap) -> NextPage {
        let token = headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string());
        NextPage::from_token(token)
    }

    fn page_params(&self, token: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(self.param.clone(), token.to_string())])
    }
}
