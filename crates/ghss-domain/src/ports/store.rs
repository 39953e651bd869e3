//! The store port (§4.A) — the analytical database wrapper's public
//! contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::entities::{ContentChunk, Repository};
use crate::error::Result;
use crate::value_objects::Embedding;

/// Snapshot returned by [`Store::get_stats`].
#[derive(Debug, Clone, Default)]
pub struct RepoStats {
    /// Total repositories in the store.
    pub total_repositories: u64,
    /// Total content chunks across all repositories.
    pub total_chunks: u64,
    /// On-disk database size, in megabytes.
    pub on_disk_mb: f64,
    /// `MAX(last_synced)` across all repositories, or `None` for an empty
    /// store.
    pub last_sync: Option<DateTime<Utc>>,
    /// Repository count per primary language.
    pub language_histogram: BTreeMap<String, u64>,
    /// Repository count per topic.
    pub topic_histogram: BTreeMap<String, u64>,
}

/// In-place metadata fields a metrics refresh may update without touching
/// chunks or embedding.
#[derive(Debug, Clone, Default)]
pub struct MetricsUpdate {
    /// Updated star count.
    pub stars: u64,
    /// Updated fork count.
    pub forks: u64,
    /// Updated open issue count.
    pub open_issues: u64,
    /// Updated total issue count.
    pub total_issues: u64,
    /// Updated open PR count.
    pub open_prs: u64,
    /// Updated total PR count.
    pub total_prs: u64,
    /// Updated 30-day commit count.
    pub commits_30d: u64,
    /// Updated 1-year commit count.
    pub commits_1y: u64,
    /// Updated total commit count.
    pub commits_total: u64,
}

/// The store's public contract (§4.A).
///
/// Implementations must honor the update-semantics workaround described in
/// the module-level documentation of the concrete store: `update_*`
/// operations read-delete-insert outside of a single transaction rather
/// than `UPDATE`ing in place, because the underlying engine has been
/// observed to raise false duplicate-key errors on DELETE+INSERT executed
/// inside one transaction against a primary-keyed row.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open the database file (if any) and apply pending schema
    /// migrations.
    async fn initialize(&self) -> Result<()>;

    /// Insert a new repository and its chunks. Fails if `full_name`
    /// already exists.
    async fn store_repository(&self, repo: &Repository, chunks: &[ContentChunk]) -> Result<()>;

    /// Replace an existing repository's row and chunks, reusing its
    /// existing `id`. Readers may briefly observe a missing row for the
    /// duration of the delete-then-insert.
    async fn update_repository(&self, repo: &Repository, chunks: &[ContentChunk]) -> Result<()>;

    /// Delete a repository and its chunks by `full_name`.
    async fn delete_repository(&self, full_name: &str) -> Result<()>;

    /// Fetch a repository and its chunks by `full_name`.
    async fn get_repository(
        &self,
        full_name: &str,
    ) -> Result<Option<(Repository, Vec<ContentChunk>)>>;

    /// List repositories in deterministic order (`stars DESC, full_name
    /// ASC`), paginated.
    async fn list_repositories(&self, limit: usize, offset: usize) -> Result<Vec<Repository>>;

    /// Aggregate statistics over the whole store.
    async fn get_stats(&self) -> Result<RepoStats>;

    /// Remove all rows.
    async fn clear(&self) -> Result<()>;

    /// Update only the activity-metrics fields of a repository in place.
    async fn update_repository_metrics(
        &self,
        full_name: &str,
        metrics: MetricsUpdate,
    ) -> Result<()>;

    /// Update only the embedding column of a repository in place.
    async fn update_repository_embedding(
        &self,
        full_name: &str,
        embedding: Embedding,
    ) -> Result<()>;

    /// Update only the purpose summary and its version/timestamp.
    async fn update_repository_summary(
        &self,
        full_name: &str,
        purpose: String,
        summary_version: u32,
    ) -> Result<()>;

    /// Repositories whose metrics are older than `stale_days`.
    async fn get_repositories_needing_metrics_update(
        &self,
        stale_days: i64,
    ) -> Result<Vec<Repository>>;

    /// Repositories missing a purpose summary, or all repositories when
    /// `force` is set.
    async fn get_repositories_needing_summary_update(&self, force: bool) -> Result<Vec<Repository>>;

    /// Rebuild the full-text index from scratch. Callers that bulk-load
    /// repositories should call this once at the end rather than after
    /// every insert.
    async fn rebuild_fts_index(&self) -> Result<()>;

    /// BM25-ranked lexical search over `{full_name, description, purpose,
    /// topics, language}`.
    async fn search_bm25(&self, query: &str, limit: usize) -> Result<Vec<(Repository, f32)>>;

    /// Cosine-similarity search over the embedding column. Similarity
    /// below zero is clamped to zero; only rows scoring at least
    /// `min_score` are returned.
    async fn search_by_embedding(
        &self,
        vector: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<(Repository, f32)>>;

    /// `(same_org_count, shared_contributor_count)` for a repository,
    /// used to annotate long-form search output.
    async fn get_related_counts(&self, full_name: &str) -> Result<(u64, u64)>;

    /// Release any held resources (file handles, connections).
    async fn close(&self) -> Result<()>;
}
