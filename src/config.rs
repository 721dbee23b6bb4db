//! Tap configuration
//!
//! Settings are merged from JSON config files and, in `ENV` mode, from
//! `TAP_CONTENTQUO_*` environment variables (with `.env` support). The merged
//! object is then validated into a [`TapConfig`].

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, OptionStringExt};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Prefix for environment variable settings
pub const ENV_PREFIX: &str = "TAP_CONTENTQUO_";

/// Sentinel `--config` value that enables environment variables
pub const ENV_SENTINEL: &str = "ENV";

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 300;

/// Default maximum retries (attempts = retries + 1)
const DEFAULT_MAX_RETRIES: u32 = 4;

/// Default request rate
const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Alternate setting names mapped onto their canonical key
const ALIASES: &[(&str, &str)] = &[
    ("api_base_url", "api_url"),
    ("base_url", "api_url"),
    ("api_key", "key"),
    ("api_secret", "secret"),
];

/// Settings whose values are integers
const INTEGER_SETTINGS: &[&str] = &["request_timeout", "max_retries", "requests_per_second"];

/// Settings whose values are strings
const STRING_SETTINGS: &[&str] = &["api_url", "key", "secret", "user_agent"];

/// Validated tap configuration
#[derive(Clone, PartialEq, Eq)]
pub struct TapConfig {
    /// Base URL of the ContentQuo API, without trailing slash
    pub api_url: String,
    /// API key
    pub key: String,
    /// API secret
    pub secret: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Request rate limit; 0 disables the limiter
    pub requests_per_second: u32,
    /// User agent sent with every request
    pub user_agent: String,
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("api_url", &self.api_url)
            .field("key", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("requests_per_second", &self.requests_per_second)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl TapConfig {
    /// Create a config with default tuning values
    pub fn new(
        api_url: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            secret: secret.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            max_retries: DEFAULT_MAX_RETRIES,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            user_agent: default_user_agent(),
        }
    }

    /// Parse and validate a config object, reporting every problem at once
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let mut obj = match value {
            JsonValue::Object(obj) => obj,
            JsonValue::Null => JsonObject::new(),
            other => {
                return Err(Error::config(format!(
                    "config must be a JSON object, got {other}"
                )))
            }
        };
        normalize_aliases(&mut obj);

        let mut problems = Vec::new();

        let api_url = required_string(&obj, "api_url", &mut problems);
        let key = required_string(&obj, "key", &mut problems);
        let secret = required_string(&obj, "secret", &mut problems);

        let api_url = api_url.and_then(|raw| match validate_url(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                problems.push(e.to_string());
                None
            }
        });

        let request_timeout = optional_u64(&obj, "request_timeout", &mut problems)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let max_retries = optional_u64(&obj, "max_retries", &mut problems)
            .map_or(DEFAULT_MAX_RETRIES, |v| v as u32);
        let requests_per_second = optional_u64(&obj, "requests_per_second", &mut problems)
            .map_or(DEFAULT_REQUESTS_PER_SECOND, |v| v as u32);
        let user_agent = obj
            .get("user_agent")
            .and_then(JsonValue::as_str)
            .map(String::from)
            .none_if_empty()
            .unwrap_or_else(default_user_agent);

        if request_timeout == 0 {
            problems.push("request_timeout must be greater than zero".to_string());
        }

        match (api_url, key, secret) {
            (Some(api_url), Some(key), Some(secret)) if problems.is_empty() => Ok(Self {
                api_url,
                key,
                secret,
                request_timeout: Duration::from_secs(request_timeout),
                max_retries,
                requests_per_second,
                user_agent,
            }),
            _ => Err(Error::ConfigValidation { problems }),
        }
    }

    /// Build the login endpoint URL
    pub fn auth_url(&self) -> String {
        format!("{}/auth/authenticate", self.api_url)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", crate::NAME, crate::VERSION)
}

fn is_alias(setting: &str) -> bool {
    ALIASES.iter().any(|(alias, _)| *alias == setting)
}

fn normalize_aliases(obj: &mut JsonObject) {
    for (alias, canonical) in ALIASES {
        if let Some(value) = obj.remove(*alias) {
            obj.entry((*canonical).to_string()).or_insert(value);
        }
    }
}

fn required_string(obj: &JsonObject, field: &str, problems: &mut Vec<String>) -> Option<String> {
    match obj.get(field) {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(JsonValue::String(_)) => {
            problems.push(format!("'{field}' must not be empty"));
            None
        }
        Some(JsonValue::Null) | None => {
            problems.push(Error::missing_field(field).to_string());
            None
        }
        Some(other) => {
            problems.push(format!("'{field}' must be a string, got {other}"));
            None
        }
    }
}

fn optional_u64(obj: &JsonObject, field: &str, problems: &mut Vec<String>) -> Option<u64> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => None,
        Some(v) => {
            let parsed = v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok()));
            if parsed.is_none() {
                problems.push(format!("'{field}' must be a non-negative integer, got {v}"));
            }
            parsed
        }
    }
}

fn validate_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            "api_url",
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

// ============================================================================
// Loader
// ============================================================================

/// A single `--config` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// JSON file on disk
    File(PathBuf),
    /// Environment variables (and `.env`)
    Env,
}

impl ConfigSource {
    /// Interpret a raw `--config` argument
    pub fn parse(arg: &str) -> Self {
        if arg == ENV_SENTINEL {
            Self::Env
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

/// Merges config files and environment variables into one settings object
#[derive(Debug, Default)]
pub struct ConfigLoader {
    values: JsonObject,
    use_env: bool,
}

impl ConfigLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loader from CLI sources; no sources at all implies `ENV`
    pub fn from_sources(sources: &[ConfigSource]) -> Result<Self> {
        let mut loader = Self::new();
        loader.use_env = sources.is_empty();

        for source in sources {
            match source {
                ConfigSource::File(path) => loader.merge_file(path)?,
                ConfigSource::Env => loader.use_env = true,
            }
        }

        Ok(loader)
    }

    /// Whether environment variables will be applied
    pub fn uses_env(&self) -> bool {
        self.use_env
    }

    /// Merge a JSON config file; later files override earlier ones
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let value: JsonValue = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid config JSON in {}: {e}", path.display())))?;
        debug!(path = %path.display(), "Loaded config file");
        self.merge_value(value)
    }

    /// Merge a JSON object
    pub fn merge_value(&mut self, value: JsonValue) -> Result<()> {
        match value {
            JsonValue::Object(mut obj) => {
                normalize_aliases(&mut obj);
                self.values.extend(obj);
                Ok(())
            }
            other => Err(Error::config(format!(
                "config must be a JSON object, got {other}"
            ))),
        }
    }

    /// Apply `TAP_CONTENTQUO_*` variables from the given iterator
    pub fn apply_env_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // Aliases first so a canonical variable always wins
        let mut vars: Vec<(String, String, String)> = vars
            .into_iter()
            .filter_map(|(name, raw)| {
                let setting = name.strip_prefix(ENV_PREFIX)?.to_lowercase();
                Some((name, setting, raw))
            })
            .collect();
        vars.sort_by_key(|(_, setting, _)| !is_alias(setting));

        for (name, setting, raw) in vars {
            let canonical = ALIASES
                .iter()
                .find(|(alias, _)| *alias == setting)
                .map_or(setting.as_str(), |(_, canonical)| canonical);

            if INTEGER_SETTINGS.contains(&canonical) {
                let parsed: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| Error::invalid_value(&name, "expected an integer"))?;
                self.values.insert(canonical.to_string(), json!(parsed));
            } else if STRING_SETTINGS.contains(&canonical) {
                self.values
                    .insert(canonical.to_string(), JsonValue::String(raw));
            } else {
                continue;
            }
            debug!(variable = %name, "Applied config from environment");
        }
        Ok(())
    }

    /// Return the merged (unvalidated) settings
    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.values)
    }

    /// Resolve environment variables if enabled, then validate
    pub fn load(mut self) -> Result<TapConfig> {
        if self.use_env {
            if let Some(path) = load_dotenv() {
                debug!(path = %path.display(), "Loaded .env file");
            }
            self.apply_env_vars(std::env::vars())?;
        }
        TapConfig::from_value(self.into_value())
    }
}

/// Load `.env` from the working directory into the process environment
///
/// Variables already set are kept. A missing file is fine.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// JSON Schema of the tap's settings, as printed by `--about`
pub fn settings_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "api_url": {
                "type": ["string"],
                "description": "API URL"
            },
            "key": {
                "type": ["string"],
                "description": "Key",
                "secret": true,
                "writeOnly": true
            },
            "secret": {
                "type": ["string"],
                "description": "Secret",
                "secret": true,
                "writeOnly": true
            },
            "request_timeout": {
                "type": ["integer", "null"],
                "description": "Request timeout in seconds",
                "default": DEFAULT_REQUEST_TIMEOUT
            },
            "max_retries": {
                "type": ["integer", "null"],
                "description": "Retries for failed requests (429/5xx/network)",
                "default": DEFAULT_MAX_RETRIES
            },
            "requests_per_second": {
                "type": ["integer", "null"],
                "description": "Client-side request rate limit, 0 to disable",
                "default": DEFAULT_REQUESTS_PER_SECOND
            },
            "user_agent": {
                "type": ["string", "null"],
                "description": "User agent sent with API requests"
            }
        },
        "required": ["api_url", "key", "secret"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use test_case::test_case;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_from_value_minimal() {
        let config = TapConfig::from_value(json!({
            "api_url": "https://api.contentquo.com/v1/",
            "key": "k",
            "secret": "s"
        }))
        .unwrap();

        assert_eq!(config.api_url, "https://api.contentquo.com/v1");
        assert_eq!(config.key, "k");
        assert_eq!(config.secret, "s");
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.requests_per_second, 10);
        assert!(config.user_agent.starts_with("tap-contentquo/"));
        assert_eq!(
            config.auth_url(),
            "https://api.contentquo.com/v1/auth/authenticate"
        );
    }

    #[test]
    fn test_from_value_accepts_aliases() {
        let config = TapConfig::from_value(json!({
            "api_base_url": "https://example.com",
            "api_key": "k",
            "api_secret": "s"
        }))
        .unwrap();

        assert_eq!(config.api_url, "https://example.com");
        assert_eq!(config.key, "k");
        assert_eq!(config.secret, "s");
    }

    #[test]
    fn test_canonical_name_wins_over_alias() {
        let config = TapConfig::from_value(json!({
            "api_url": "https://canonical.example.com",
            "api_base_url": "https://alias.example.com",
            "key": "k",
            "secret": "s"
        }))
        .unwrap();
        assert_eq!(config.api_url, "https://canonical.example.com");
    }

    #[test]
    fn test_from_value_reports_all_missing_fields() {
        let err = TapConfig::from_value(json!({})).unwrap_err();
        match err {
            Error::ConfigValidation { problems } => {
                assert_eq!(problems.len(), 3);
                assert!(problems[0].contains("api_url"));
                assert!(problems[1].contains("key"));
                assert!(problems[2].contains("secret"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test_case(json!({"api_url": "not a url", "key": "k", "secret": "s"}) ; "unparseable url")]
    #[test_case(json!({"api_url": "ftp://example.com", "key": "k", "secret": "s"}) ; "bad scheme")]
    #[test_case(json!({"api_url": "https://example.com", "key": "", "secret": "s"}) ; "empty key")]
    #[test_case(json!({"api_url": "https://example.com", "key": 7, "secret": "s"}) ; "non string key")]
    #[test_case(json!({"api_url": "https://example.com", "key": "k", "secret": "s", "max_retries": -1}) ; "negative retries")]
    #[test_case(json!({"api_url": "https://example.com", "key": "k", "secret": "s", "request_timeout": 0}) ; "zero timeout")]
    #[test_case(json!(["not", "an", "object"]) ; "not an object")]
    fn test_from_value_rejects(value: JsonValue) {
        assert!(TapConfig::from_value(value).is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = TapConfig::new("https://example.com", "my-key", "my-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("my-key"));
        assert!(!debug.contains("my-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_source_parse() {
        assert_eq!(ConfigSource::parse("ENV"), ConfigSource::Env);
        assert_eq!(
            ConfigSource::parse("config.json"),
            ConfigSource::File(PathBuf::from("config.json"))
        );
    }

    #[test]
    fn test_loader_merges_files_in_order() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        write!(
            first,
            r#"{{"api_url": "https://first.example.com", "key": "k1", "secret": "s1"}}"#
        )
        .unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        write!(second, r#"{{"api_key": "k2"}}"#).unwrap();

        let loader = ConfigLoader::from_sources(&[
            ConfigSource::File(first.path().to_path_buf()),
            ConfigSource::File(second.path().to_path_buf()),
        ])
        .unwrap();
        assert!(!loader.uses_env());

        let config = TapConfig::from_value(loader.into_value()).unwrap();
        assert_eq!(config.api_url, "https://first.example.com");
        assert_eq!(config.key, "k2");
        assert_eq!(config.secret, "s1");
    }

    #[test]
    fn test_loader_missing_file() {
        let err = ConfigLoader::from_sources(&[ConfigSource::File(PathBuf::from(
            "/definitely/not/here.json",
        ))])
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_loader_no_sources_uses_env() {
        let loader = ConfigLoader::from_sources(&[]).unwrap();
        assert!(loader.uses_env());

        let loader = ConfigLoader::from_sources(&[ConfigSource::Env]).unwrap();
        assert!(loader.uses_env());
    }

    #[test]
    fn test_env_vars_override_file_values() {
        let mut loader = ConfigLoader::new();
        loader
            .merge_value(json!({"api_url": "https://file.example.com", "key": "file-key"}))
            .unwrap();
        loader
            .apply_env_vars(env(&[
                ("TAP_CONTENTQUO_KEY", "env-key"),
                ("TAP_CONTENTQUO_SECRET", "env-secret"),
                ("TAP_CONTENTQUO_API_BASE_URL", "https://env.example.com"),
                ("TAP_CONTENTQUO_MAX_RETRIES", "2"),
                ("TAP_CONTENTQUO_LOG_LEVEL", "debug"),
                ("UNRELATED", "x"),
            ]))
            .unwrap();

        let config = TapConfig::from_value(loader.into_value()).unwrap();
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.key, "env-key");
        assert_eq!(config.secret, "env-secret");
        assert_eq!(config.max_retries, 2);
    }

    #[test_case(&[("TAP_CONTENTQUO_API_URL", "https://canonical.example.com"), ("TAP_CONTENTQUO_API_BASE_URL", "https://alias.example.com")] ; "canonical first")]
    #[test_case(&[("TAP_CONTENTQUO_API_BASE_URL", "https://alias.example.com"), ("TAP_CONTENTQUO_API_URL", "https://canonical.example.com")] ; "alias first")]
    fn test_canonical_env_var_beats_alias(vars: &[(&str, &str)]) {
        let mut loader = ConfigLoader::new();
        loader.apply_env_vars(env(vars)).unwrap();
        assert_eq!(
            loader.into_value()["api_url"],
            json!("https://canonical.example.com")
        );
    }

    #[test]
    fn test_env_var_integer_must_parse() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_vars(env(&[("TAP_CONTENTQUO_REQUEST_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("TAP_CONTENTQUO_REQUEST_TIMEOUT"));
    }

    #[test]
    fn test_settings_schema_requires_credentials() {
        let schema = settings_schema();
        assert_eq!(schema["required"], json!(["api_url", "key", "secret"]));
        assert_eq!(schema["properties"]["secret"]["secret"], json!(true));
    }
}
