//! `PerformFullSync` / `SyncSpecificRepository` (§4.D) — the worker-pool
//! orchestration that drives a batch of [`RemoteRepository`] entries
//! through content processing, embedding and the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ghss_domain::entities::{Repository, SyncStats};
use ghss_domain::error::{Error, Result};
use ghss_domain::ports::{CodeHostClient, CommitActivity, EmbeddingProvider, RemoteRepository, Store};

use super::plan::{build_plan, metadata_changed};
use crate::content::{priority_paths, process_repository};

/// Repeat-scoped collaborators a [`SyncPipeline`] needs; bundled so the
/// pipeline itself stays free of concrete adapter types.
pub struct PipelineDeps {
    pub code_host: Arc<dyn CodeHostClient>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn Store>,
}

/// Drives the remote/local diff and the batch worker pool described in
/// §4.D. One instance per sync run.
pub struct SyncPipeline {
    deps: PipelineDeps,
}

const LOCAL_PAGE_SIZE: usize = 100;
const BATCH_SLEEP: Duration = Duration::from_secs(1);
const MAX_WORKERS: usize = 8;

impl SyncPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self { deps }
    }

    /// Step 1-2: fetch the remote starred set and page in local state.
    async fn load_local_repositories(&self) -> Result<HashMap<String, Repository>> {
        let mut local = HashMap::new();
        let mut offset = 0usize;
        loop {
            let page = self
                .deps
                .store
                .list_repositories(LOCAL_PAGE_SIZE, offset)
                .await?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len();
            for repo in page {
                local.insert(repo.full_name.clone(), repo);
            }
            offset += page_len;
            if page_len < LOCAL_PAGE_SIZE {
                break;
            }
        }
        Ok(local)
    }

    /// Run a full sync: diff, remove, then process adds/updates in
    /// batches of `batch_size`.
    pub async fn perform_full_sync(
        &self,
        user: &str,
        batch_size: usize,
        force: bool,
        cancel: CancellationToken,
    ) -> Result<SyncStats> {
        let stats = Arc::new(SyncStats::default());

        info!(user, "fetching starred repositories");
        let remote = self.deps.code_host.get_starred_repos(user).await?;
        let local = self.load_local_repositories().await?;

        let plan = build_plan(remote, &local, force);
        stats.increment(|c| {
            c.total_repos = (plan.to_add.len() + plan.to_update.len() + plan.to_remove.len()) as u64;
        });

        // Step 4: removals happen serially, before any add/update.
        for full_name in &plan.to_remove {
            match self.deps.store.delete_repository(full_name).await {
                Ok(()) => stats.increment(|c| c.removed_repos += 1),
                Err(err) => {
                    warn!(full_name, %err, "failed to delete repository");
                    stats.increment(|c| c.error_repos += 1);
                }
            }
        }

        let mut work: Vec<RemoteRepository> = plan.to_add;
        work.extend(plan.to_update);

        for batch in work.chunks(batch_size.max(1)) {
            if cancel.is_cancelled() {
                return Err(Error::cancelled("sync cancelled"));
            }
            self.process_batch(batch, &local, batch_size, Arc::clone(&stats), cancel.clone())
                .await?;
            if !cancel.is_cancelled() {
                tokio::time::sleep(BATCH_SLEEP).await;
            }
        }

        Ok(Arc::try_unwrap(stats).unwrap_or_default())
    }

    /// Process a single named repository outside a full sync run.
    pub async fn sync_specific_repository(
        &self,
        full_name: &str,
        force: bool,
        cancel: CancellationToken,
    ) -> Result<SyncStats> {
        let stats = Arc::new(SyncStats::default());
        let existing = self.deps.store.get_repository(full_name).await?;
        let metadata = self.deps.code_host.get_repository_metadata(full_name).await?;

        let needs_update = match &existing {
            None => true,
            Some((local_repo, _)) => {
                force
                    || metadata.updated_at > local_repo.last_synced
                    || super::plan::metadata_changed(&metadata, local_repo)
            }
        };

        stats.increment(|c| c.total_repos = 1);
        if !needs_update {
            stats.increment(|c| c.skipped_repos = 1);
            return Ok(Arc::try_unwrap(stats).unwrap_or_default());
        }

        let existing_repo = existing.as_ref().map(|(repo, _)| repo);
        self.process_one(&metadata, existing_repo, &stats, cancel).await;
        Ok(Arc::try_unwrap(stats).unwrap_or_default())
    }

    /// Refresh activity metrics (issues, pull requests, commit counts) for
    /// repositories whose metrics are older than `stale_days`, without
    /// re-fetching or re-chunking content. Cheaper than a full sync and
    /// run on its own schedule.
    pub async fn refresh_stale_metrics(&self, stale_days: i64) -> Result<u64> {
        let stale = self
            .deps
            .store
            .get_repositories_needing_metrics_update(stale_days)
            .await?;

        let mut refreshed = 0u64;
        for repo in &stale {
            let commit_activity = self
                .deps
                .code_host
                .get_commit_activity(&repo.full_name)
                .await
                .unwrap_or_default();
            let (open_prs, total_prs) = self
                .deps
                .code_host
                .get_pull_counts(&repo.full_name)
                .await
                .unwrap_or((0, 0));
            let (open_issues, total_issues) = self
                .deps
                .code_host
                .get_issue_counts(&repo.full_name)
                .await
                .unwrap_or((0, 0));
            let stars_forks_size = self
                .deps
                .code_host
                .get_repository_metadata(&repo.full_name)
                .await?;

            let update = ghss_domain::ports::MetricsUpdate {
                stars: stars_forks_size.stars,
                forks: stars_forks_size.forks,
                open_issues,
                total_issues,
                open_prs,
                total_prs,
                commits_30d: commit_activity.commits_30d,
                commits_1y: commit_activity.commits_1y,
                commits_total: commit_activity.commits_total,
            };
            self.deps
                .store
                .update_repository_metrics(&repo.full_name, update)
                .await?;
            refreshed += 1;
        }
        Ok(refreshed)
    }

    /// §4.D step 6: spawn `W` workers reading from a bounded channel.
    async fn process_batch(
        &self,
        batch: &[RemoteRepository],
        local: &HashMap<String, Repository>,
        batch_size: usize,
        stats: Arc<SyncStats>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let num_cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let workers = (batch_size / 5).max(1).min(num_cpus).min(MAX_WORKERS);

        let (tx, rx) = mpsc::channel::<RemoteRepository>(batch.len().max(1));
        for repo in batch.iter().cloned() {
            // Batch length bounds the channel capacity, so this never blocks.
            let _ = tx.send(repo).await;
        }
        drop(tx);

        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let rx = Arc::clone(&rx);
            let code_host = Arc::clone(&self.deps.code_host);
            let embedder = Arc::clone(&self.deps.embedder);
            let store = Arc::clone(&self.deps.store);
            let stats = Arc::clone(&stats);
            let local = local.clone();
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let next = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(remote_repo) = next else {
                        return;
                    };
                    let existing = local.get(&remote_repo.full_name);
                    process_one_with_deps(
                        &code_host,
                        &embedder,
                        &store,
                        &remote_repo,
                        existing,
                        &stats,
                        cancel.clone(),
                    )
                    .await;
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        if cancel.is_cancelled() {
            return Err(Error::cancelled("sync cancelled mid-batch"));
        }
        Ok(())
    }

    async fn process_one(
        &self,
        remote_repo: &RemoteRepository,
        existing: Option<&Repository>,
        stats: &SyncStats,
        cancel: CancellationToken,
    ) {
        process_one_with_deps(
            &self.deps.code_host,
            &self.deps.embedder,
            &self.deps.store,
            remote_repo,
            existing,
            stats,
            cancel,
        )
        .await;
    }
}

/// Whether `err` should abort the whole batch rather than being counted
/// as this repository's own failure (spec.md §7: rate-limit and
/// cancellation errors abort the batch).
fn should_abort_batch(err: &Error) -> bool {
    matches!(err, Error::RateLimit { .. } | Error::Cancelled { .. })
}

/// One repository's worker-task body: fetch content, process, embed,
/// store. Per-repository failures are recorded, never propagated; a
/// rate-limit or cancellation error instead cancels `cancel` so every
/// worker in the batch stops after its current repository.
async fn process_one_with_deps(
    code_host: &Arc<dyn CodeHostClient>,
    embedder: &Arc<dyn EmbeddingProvider>,
    store: &Arc<dyn Store>,
    remote_repo: &RemoteRepository,
    existing: Option<&Repository>,
    stats: &SyncStats,
    cancel: CancellationToken,
) {
    let is_update = existing.is_some();
    if cancel.is_cancelled() {
        return;
    }

    let full_name = remote_repo.full_name.clone();

    let raw_files = match code_host
        .get_repository_content(&full_name, &priority_paths())
        .await
    {
        Ok(files) => files,
        Err(err) if should_abort_batch(&err) => {
            error!(full_name, %err, "aborting sync batch");
            cancel.cancel();
            return;
        }
        Err(err) => {
            error!(full_name, %err, "failed to fetch repository content");
            stats.increment(|c| c.error_repos += 1);
            return;
        }
    };

    let processed = process_repository(raw_files);

    let commit_activity = match code_host.get_commit_activity(&full_name).await {
        Ok(activity) => activity,
        Err(err) if should_abort_batch(&err) => {
            error!(full_name, %err, "aborting sync batch");
            cancel.cancel();
            return;
        }
        Err(_) => CommitActivity::default(),
    };
    let (open_prs, total_prs) = match code_host.get_pull_counts(&full_name).await {
        Ok(counts) => counts,
        Err(err) if should_abort_batch(&err) => {
            error!(full_name, %err, "aborting sync batch");
            cancel.cancel();
            return;
        }
        Err(_) => (0, 0),
    };
    let (open_issues, total_issues) = match code_host.get_issue_counts(&full_name).await {
        Ok(counts) => counts,
        Err(err) if should_abort_batch(&err) => {
            error!(full_name, %err, "aborting sync batch");
            cancel.cancel();
            return;
        }
        Err(_) => (0, 0),
    };

    let purpose_text = format!(
        "{}. {}",
        full_name,
        remote_repo.description.clone().unwrap_or_default()
    );
    let embedding = match embedder.embed(&purpose_text).await {
        Ok(embedding) => Some(embedding),
        Err(err) => {
            warn!(full_name, %err, "embedding failed, storing without it");
            None
        }
    };
    let purpose = embedder.summarize(&purpose_text).await.ok();

    let now = chrono::Utc::now();
    let id = existing
        .map(|repo| repo.id.clone())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let repository = Repository {
        id,
        full_name: full_name.clone(),
        description: remote_repo.description.clone(),
        homepage: remote_repo.homepage.clone(),
        language: remote_repo.language.clone(),
        stars: remote_repo.stars,
        forks: remote_repo.forks,
        size_kb: remote_repo.size_kb,
        created_at: remote_repo.created_at,
        updated_at: remote_repo.updated_at,
        last_synced: now,
        open_issues,
        total_issues,
        open_prs,
        total_prs,
        commits_30d: commit_activity.commits_30d,
        commits_1y: commit_activity.commits_1y,
        commits_total: commit_activity.commits_total,
        topics: remote_repo.topics.clone(),
        languages: remote_repo.languages.clone(),
        contributors: remote_repo.contributors.clone(),
        license_name: remote_repo.license_name.clone(),
        license_spdx: remote_repo.license_spdx.clone(),
        purpose: purpose.or_else(|| existing.and_then(|repo| repo.purpose.clone())),
        purpose_generated_at: Some(now),
        summary_version: existing.map_or(1, |repo| repo.summary_version.max(1)),
        embedding: embedding.or_else(|| existing.and_then(|repo| repo.embedding.clone())),
        content_hash: processed.content_hash.clone(),
    };

    let content_changed = existing.is_none_or(|repo| repo.content_hash != processed.content_hash);
    let metadata_diff = existing.is_some_and(|repo| metadata_changed(remote_repo, repo));
    let result = if is_update {
        store.update_repository(&repository, &processed.chunks).await
    } else {
        store.store_repository(&repository, &processed.chunks).await
    };

    match result {
        Ok(()) => {
            stats.increment(|c| {
                c.processed_repos += 1;
                if is_update {
                    c.updated_repos += 1;
                    if content_changed {
                        c.content_changes += 1;
                    } else if metadata_diff {
                        c.metadata_changes += 1;
                    }
                } else {
                    c.new_repos += 1;
                }
            });
        }
        Err(err) => {
            error!(full_name, %err, "failed to store repository");
            stats.increment(|c| c.error_repos += 1);
        }
    }
}
