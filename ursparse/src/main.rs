use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Mode};

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // stdout carries data, so logs go to stderr.
    let default_filter = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.mode() {
        Mode::Decode => commands::decode(cli.block_size)?,
        Mode::Encode => commands::encode()?,
        Mode::Map => commands::map(cli.json)?,
    };

    Ok(())
}
