//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::core::RunMode;

/// Kiln reactive build orchestrator
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Run mode: development watches and rebuilds, production builds once
    #[arg(short, long, env = "KILN_ENV", value_enum, default_value_t = RunMode::Production)]
    pub mode: RunMode,

    /// Config file path (default: kiln.toml)
    #[arg(short = 'C', long, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Source directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub src: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dist: Option<PathBuf>,

    /// Print debug messages
    #[arg(short, long)]
    pub verbose: bool,
}
