use anyhow::{Context, Result};

use super::{super::args::CheckCommand, super::exit_status::ExitStatus, super::report, prepare};
use crate::{core::run_check, issues::count_errors};

pub async fn check(cmd: CheckCommand) -> Result<ExitStatus> {
    let ctx = prepare(&cmd.common)?;
    let output = tokio::task::spawn_blocking(move || run_check(&ctx))
        .await
        .context("Validation task panicked")?;

    if output.issues.is_empty() {
        report::print_check_success(output.source_files, output.locales);
        return Ok(ExitStatus::Success);
    }

    report::report(&output.issues);
    Ok(ExitStatus::from_error_count(count_errors(&output.issues)))
}
