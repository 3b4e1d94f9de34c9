mod cleaning;
mod config;
mod csv_file;
mod decompose;
mod manager;
mod model;
mod render;
mod stats;
mod views;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Directory holding `config.toml` and the data directory.
    #[arg(long)]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the cleaned series of every data file to the output directory.
    Clean,

    /// Render the charts of every data file to the figure directory.
    Analyze,

    /// Remove the output and figure directories.
    Reset,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.project_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Clean => mgr.clean_data()?,
        Command::Analyze => mgr.analyze_data()?,
        Command::Reset => mgr.reset()?,
    }

    Ok(())
}
