//! Signal desk CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run(Cli::parse()).await
}
