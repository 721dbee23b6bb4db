//! HTTP client module
//!
//! Wraps `reqwest` with the behaviour every ContentQuo request needs:
//!
//! - **Session auth**: token header on each request, one re-login on 401
//! - **Retries**: exponential backoff on 429/5xx and network errors
//! - **Rate limiting**: token bucket using governor
//! - **Metrics**: `http_request_duration` timer per request

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
