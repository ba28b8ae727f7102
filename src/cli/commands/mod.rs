use std::{env, path::PathBuf};

use anyhow::{Context, Result};

use super::args::CommonArgs;
use crate::{config::load_config, core::RunContext};

pub mod build;
pub mod check;
pub mod init;

/// Canonical project root: `--root` if given, otherwise the working directory.
pub(crate) fn project_root(root: Option<&PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to read current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("Project root {:?} does not exist", root))
}

/// Load the config file, apply CLI overrides and build the run context.
pub(crate) fn prepare(common: &CommonArgs) -> Result<RunContext> {
    let root = project_root(common.root.as_ref())?;
    let loaded = load_config(&root)?;
    let mut config = loaded.config;
    common.apply_to(&mut config);
    config.validate()?;

    if loaded.from_file {
        tracing::debug!("Loaded config from {}", root.display());
    } else {
        tracing::debug!("No config file found, using defaults");
    }

    Ok(RunContext::new(root, config))
}
