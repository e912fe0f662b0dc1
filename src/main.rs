//! tola-imgref - rewrite markdown image references to content-addressed assets.

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use tola_imgref::cli::{self, Cli, Commands};
use tola_imgref::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = cli::build::load_config(&cli, &cwd)?;

    // Image pipelines are awaited cooperatively on one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    match &cli.command {
        Commands::Build { args } => runtime.block_on(cli::build::build_files(args, &config)),
    }
}
