//! Path templates
//!
//! Child stream paths carry `{name}` placeholders that are filled from the
//! parent context, e.g. `/evaluations/{eid}/issues`.

use crate::error::{Error, Result};
use crate::types::{scalar_to_string, Context};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Render a path template with values from the context
///
/// Every placeholder must resolve to a scalar context value. All missing
/// names are reported together.
pub fn render(template: &str, ctx: Option<&Context>) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match ctx.and_then(|c| c.get(name)).and_then(scalar_to_string) {
            Some(value) => value,
            None => {
                missing.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains placeholders
pub fn has_placeholders(s: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(s)
}

/// Placeholder names in order of appearance
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}
