use anyhow::{Context, Result};
use colored::Colorize;

use super::{super::args::InitCommand, super::exit_status::ExitStatus, super::report::SUCCESS_MARK, project_root};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub async fn init(cmd: InitCommand) -> Result<ExitStatus> {
    let root = project_root(cmd.root.as_ref())?;
    let config_path = root.join(CONFIG_FILE_NAME);

    if tokio::fs::try_exists(&config_path).await? {
        eprintln!("Error: {} already exists", CONFIG_FILE_NAME);
        return Ok(ExitStatus::Failure);
    }

    tokio::fs::write(&config_path, default_config_json()?)
        .await
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", CONFIG_FILE_NAME).green()
    );

    Ok(ExitStatus::Success)
}
