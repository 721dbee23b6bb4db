//! Logging setup
//!
//! Logs go to stderr so stdout carries nothing but Singer messages.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted when `RUST_LOG` is unset
pub const LOG_LEVEL_ENV: &str = "TAP_CONTENTQUO_LOG_LEVEL";

/// Normalise a level name; unknown names fall back to `info`
pub fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}

/// Level named by `TAP_CONTENTQUO_LOG_LEVEL`, or `info`
pub fn configured_level() -> &'static str {
    normalize_level(&std::env::var(LOG_LEVEL_ENV).unwrap_or_default())
}

/// Initialize the tracing subscriber
///
/// `.env` is loaded first so it can set the level. `RUST_LOG` wins, then
/// `TAP_CONTENTQUO_LOG_LEVEL`, then `info`. Calling it twice is harmless.
pub fn init() {
    crate::config::load_dotenv();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
