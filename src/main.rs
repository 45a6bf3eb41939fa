//! Kiln - a reactive build orchestrator for single-page applications.

#![allow(dead_code)]

mod cli;
mod compiler;
mod config;
mod core;
mod lifecycle;
mod logger;
mod pipeline;
mod signal;
mod utils;
mod watch;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::KilnConfig;
use lifecycle::Controller;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = KilnConfig::load(&cli)?;
    debug!("config"; "root {}", config.root.display());

    // Setup Ctrl+C handler before the loop starts
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::unbounded_channel();
    core::setup_shutdown_handler(shutdown_tx)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the event loop")?;

    let controller = Controller::new(&config).with_shutdown_signal(shutdown_rx);
    let summary = runtime.block_on(controller.run())?;

    debug!(
        "dev";
        "{} built, {} failed, shutdown requested: {}",
        summary.builds,
        summary.failures,
        core::is_shutdown()
    );
    Ok(summary.exit_code())
}
