//! `ghss sync` — run the full sync pipeline, or a single repository
//! (§4.D).

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ghss_application::{PipelineDeps, SyncPipeline};

use super::Context;

pub async fn run(
    ctx: &Context,
    repo: Option<String>,
    verbose: bool,
    batch_size: usize,
    force: bool,
) -> Result<()> {
    let deps = PipelineDeps {
        code_host: ctx.code_host.clone(),
        embedder: ctx.embedder.clone(),
        store: ctx.store.clone(),
    };
    let pipeline = SyncPipeline::new(deps);

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_signal.cancel();
        }
    });

    let stats = if let Some(full_name) = repo {
        println!("syncing {full_name}...");
        pipeline
            .sync_specific_repository(&full_name, force, cancel)
            .await?
    } else {
        println!("syncing starred repositories...");
        pipeline
            .perform_full_sync("", batch_size, force, cancel)
            .await?
    };

    let counts = stats.snapshot();
    if verbose {
        info!(?counts, "sync complete");
    }
    println!(
        "synced: {} total, {} new, {} updated, {} removed, {} skipped, {} errors",
        counts.total_repos,
        counts.new_repos,
        counts.updated_repos,
        counts.removed_repos,
        counts.skipped_repos,
        counts.error_repos,
    );

    Ok(())
}
