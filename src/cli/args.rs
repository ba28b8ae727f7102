//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `build`: extract keys and write chunks and the manifest (the default)
//! - `check`: validate translation accessor usage without writing anything
//! - `init`: write a default `.intlchunksrc.json`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, ExtractorKind};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arguments for the default `build` command
    #[command(flatten)]
    pub common: CommonArgs,
}

impl Arguments {
    /// The command to run; no subcommand means `build`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Build(BuildCommand {
            common: self.common,
        }))
    }

    /// Verbose flag of whichever command will run.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Build(cmd)) => cmd.common.verbose,
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::Init(cmd)) => cmd.verbose,
            None => self.common.verbose,
        }
    }
}

/// Common arguments shared by `build` and `check`.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root directory (default: current directory)
    #[arg(long, env = "INTL_CHUNKS_ROOT")]
    pub root: Option<PathBuf>,

    /// Messages directory (overrides config file)
    #[arg(long)]
    pub messages_dir: Option<String>,

    /// Output directory for chunks and the manifest (overrides config file)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Key extraction strategy (overrides config file)
    #[arg(long, value_enum)]
    pub extractor: Option<ExtractorKind>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Apply CLI overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.messages_dir {
            config.messages_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(extractor) = self.extractor {
            config.extractor = extractor;
        }
    }
}

#[derive(Debug, Args)]
pub struct BuildCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Directory to create the config file in (default: current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translation keys and write per-route and per-menu chunks
    Build(BuildCommand),
    /// Validate translation accessor usage without writing anything
    Check(CheckCommand),
    /// Initialize a new .intlchunksrc.json configuration file
    Init(InitCommand),
}
