//! flog CLI entry point.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(filter) = cli.trace_filter() {
        config.tracing.filter = filter.to_string();
    }
    let _guard = flog_core::log::init_from_config(&config.tracing)?;

    tracing::debug!(layers = ?config.layers(), "Loaded configuration");
    cli.execute(&config)
}
