//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Singer tap for the ContentQuo REST API
#[derive(Parser, Debug)]
#[command(name = "tap-contentquo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Display package metadata and settings
    #[arg(long)]
    pub about: bool,

    /// Output format for --about
    #[arg(long, value_enum, default_value_t = AboutFormat::Json)]
    pub format: AboutFormat,

    /// Configuration file, or ENV to read TAP_CONTENTQUO_* variables (repeatable)
    #[arg(long, value_name = "FILE|ENV")]
    pub config: Vec<String>,

    /// Print the stream catalog
    #[arg(long)]
    pub discover: bool,

    /// Test the connection (all) or print schemas (schema)
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "all")]
    pub test: Option<TestMode>,

    /// Catalog selecting streams and properties
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// State file with bookmarks
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,
}

/// `--about` output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AboutFormat {
    /// JSON object
    #[default]
    Json,
    /// Markdown document
    Markdown,
}

/// `--test` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TestMode {
    /// Read one record per stream, write nothing
    All,
    /// Write SCHEMA messages only
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tap-contentquo").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults_to_sync() {
        let cli = parse(&[]);
        assert!(!cli.about);
        assert!(!cli.discover);
        assert_eq!(cli.test, None);
        assert!(cli.config.is_empty());
        assert_eq!(cli.format, AboutFormat::Json);
    }

    #[test]
    fn test_about_markdown() {
        let cli = parse(&["--about", "--format", "markdown"]);
        assert!(cli.about);
        assert_eq!(cli.format, AboutFormat::Markdown);
    }

    #[test]
    fn test_repeatable_config() {
        let cli = parse(&["--config", "a.json", "--config", "ENV", "--discover"]);
        assert_eq!(cli.config, vec!["a.json", "ENV"]);
        assert!(cli.discover);
    }

    #[test]
    fn test_test_flag_values() {
        assert_eq!(parse(&["--test"]).test, Some(TestMode::All));
        assert_eq!(parse(&["--test", "schema"]).test, Some(TestMode::Schema));
        assert_eq!(parse(&["--test=all"]).test, Some(TestMode::All));
    }

    #[test]
    fn test_catalog_and_state() {
        let cli = parse(&["--config", "c.json", "--catalog", "cat.json", "--state", "s.json"]);
        assert_eq!(cli.catalog, Some(PathBuf::from("cat.json")));
        assert_eq!(cli.state, Some(PathBuf::from("s.json")));
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Cli::try_parse_from(["tap-contentquo", "--about", "--format", "yaml"]).is_err());
    }
}
