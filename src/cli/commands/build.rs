use anyhow::{Context, Result};
use chrono::Utc;

use super::{super::args::BuildCommand, super::exit_status::ExitStatus, super::report, prepare};
use crate::{
    core::{
        chunks::{AssetSink, FsSink, read_manifest},
        run_build,
    },
    issues::count_errors,
};

pub async fn build(cmd: BuildCommand) -> Result<ExitStatus> {
    let ctx = prepare(&cmd.common)?;
    let previous = read_manifest(&ctx.output_dir);

    let (ctx, previous, output) = tokio::task::spawn_blocking(move || {
        let output = run_build(&ctx, previous.as_ref(), Utc::now());
        (ctx, previous, output)
    })
    .await
    .context("Extraction task panicked")?;
    let output = output?;
    report::report(&output.issues);

    let mut sink = FsSink::new(&ctx.output_dir)?;
    let removed = sink.remove_stale(&output.assets, previous.as_ref())?;
    for asset in output.assets {
        sink.emit(asset)?;
    }
    tracing::debug!(
        "{} file(s) written, {} stale file(s) removed in {}",
        sink.written(),
        removed,
        ctx.display_path(&ctx.output_dir)
    );

    report::print_build_success(&output.manifest.stats);
    Ok(ExitStatus::from_error_count(count_errors(&output.issues)))
}
