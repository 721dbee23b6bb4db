//! Authentication module
//!
//! ContentQuo issues a session token from `POST /auth/authenticate`; every
//! API call then carries it in the `X-Auth-Token` header.
//!
//! The `Authenticator` caches the token and logs in again on demand.

mod authenticator;
mod types;

pub use authenticator::{extract_jsonpath, Authenticator};
pub use types::{AuthConfig, DEFAULT_TOKEN_HEADER, DEFAULT_TOKEN_PATH};

#[cfg(test)]
mod tests;
