//! Command-line layer: argument parsing, command dispatch and terminal output.

use anyhow::Result;

mod args;
mod commands;
mod exit_status;
mod report;

pub use args::{Arguments, BuildCommand, CheckCommand, Command, CommonArgs, InitCommand};
pub use exit_status::ExitStatus;

/// Run the parsed command on a current-thread runtime. Extraction itself
/// runs on the blocking pool.
pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match args.into_command() {
            Command::Build(cmd) => commands::build::build(cmd).await,
            Command::Check(cmd) => commands::check::check(cmd).await,
            Command::Init(cmd) => commands::init::init(cmd).await,
        }
    })
}
