//! Auth configuration types

use crate::config::TapConfig;

/// Header the API expects the session token in
pub const DEFAULT_TOKEN_HEADER: &str = "X-Auth-Token";

/// Path of the token in the login response
pub const DEFAULT_TOKEN_PATH: &str = "token";

/// Authentication configuration
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// A pre-issued token sent as a header
    Token {
        /// Header name
        header: String,
        /// Token value
        token: String,
    },

    /// Session login with key and secret
    Session {
        /// Login endpoint URL
        login_url: String,
        /// API key
        key: String,
        /// API secret
        secret: String,
        /// Path of the token in the login response
        token_path: String,
        /// Header the token is sent in
        token_header: String,
    },
}

impl AuthConfig {
    /// ContentQuo session auth for the given tap config
    pub fn contentquo(config: &TapConfig) -> Self {
        Self::Session {
            login_url: config.auth_url(),
            key: config.key.clone(),
            secret: config.secret.clone(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }

    /// Whether a rejected token can be renewed by logging in again
    pub fn can_refresh(&self) -> bool {
        matches!(self, Self::Session { .. })
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Token { header, .. } => f
                .debug_struct("Token")
                .field("header", header)
                .finish_non_exhaustive(),
            Self::Session {
                login_url,
                token_header,
                ..
            } => f
                .debug_struct("Session")
                .field("login_url", login_url)
                .field("token_header", token_header)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(matches!(config, AuthConfig::None));
        assert!(!config.can_refresh());
    }

    #[test]
    fn test_contentquo_session() {
        let tap = TapConfig::new("https://api.example.com/", "k", "s");
        let auth = AuthConfig::contentquo(&tap);
        match &auth {
            AuthConfig::Session {
                login_url,
                key,
                secret,
                token_path,
                token_header,
            } => {
                assert_eq!(login_url, "https://api.example.com/auth/authenticate");
                assert_eq!(key, "k");
                assert_eq!(secret, "s");
                assert_eq!(token_path, "token");
                assert_eq!(token_header, "X-Auth-Token");
            }
            other => panic!("unexpected auth config: {other:?}"),
        }
        assert!(auth.can_refresh());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let tap = TapConfig::new("https://api.example.com", "the-key", "the-secret");
        let debug = format!("{:?}", AuthConfig::contentquo(&tap));
        assert!(!debug.contains("the-key"));
        assert!(!debug.contains("the-secret"));
    }
}
