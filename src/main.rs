//! tap-contentquo CLI
//!
//! Singer tap entry point

use anyhow::Context;
use clap::Parser;
use tap_contentquo::cli::{Cli, Runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tap_contentquo::logging::init();

    let cli = Cli::parse();
    Runner::new(cli)
        .run()
        .await
        .context("tap-contentquo failed")?;
    Ok(())
}
