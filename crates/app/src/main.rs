use clap::Parser;
use fintrack_engine::{FileStore, Tracker};

mod cli;
mod commands;
mod config;
mod error;
mod prompt;
mod render;

use crate::error::Result;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = config::load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fintrack={level},fintrack_engine={level}",
            level = config.level
        ))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("using data directory {}", config.data_dir);
    let mut tracker = Tracker::open(FileStore::new(&config.data_dir));

    commands::run(cli.command, &mut tracker, &config)
}
