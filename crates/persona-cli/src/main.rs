//! `persona` binary entry point.

use anyhow::Result;
use clap::Parser;
use persona_cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    persona_cli::run(args).await?;
    Ok(())
}
