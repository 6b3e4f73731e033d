use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{ColorChoice, LogLevel};

/// Interactive in-memory file system shell.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// File the tree is restored from at startup and saved to on exit
    #[clap(long, short, default_value = "file_system.bin")]
    pub state_file: PathBuf,

    /// Neither load nor save the tree
    #[clap(long)]
    pub no_persist: bool,

    /// Start from an empty tree even if saved state exists
    #[clap(long)]
    pub fresh: bool,

    /// Run the built-in smoke sequence before reading commands
    #[clap(long)]
    pub demo: bool,

    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,
}
