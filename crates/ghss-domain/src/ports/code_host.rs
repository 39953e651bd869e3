//! The code-host client port (§6, H) — the narrow capability set consumed
//! by the sync pipeline and content processor. A concrete implementation
//! (the GitHub REST client) lives in the providers crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::entities::Contributor;
use crate::error::Result;

/// Raw repository metadata as reported by the remote code host, prior to
/// being merged into a local [`crate::entities::Repository`].
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    /// `owner/name`.
    pub full_name: String,
    /// Description, if set.
    pub description: Option<String>,
    /// Homepage URL, if set.
    pub homepage: Option<String>,
    /// Primary language.
    pub language: Option<String>,
    /// Star count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
    /// Size in KB.
    pub size_kb: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last metadata update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Ordered topics.
    pub topics: Vec<String>,
    /// Bytes of code per language.
    pub languages: BTreeMap<String, u64>,
    /// Top contributors.
    pub contributors: Vec<Contributor>,
    /// License display name.
    pub license_name: Option<String>,
    /// License SPDX id.
    pub license_spdx: Option<String>,
}

/// A single raw content entry as returned by `GetRepositoryContent`.
#[derive(Debug, Clone)]
pub struct RemoteContent {
    /// Path within the repository.
    pub path: String,
    /// Remote-reported file type ("file", "dir", ...); only "file" entries
    /// are of interest to the content processor.
    pub file_type: String,
    /// Raw content, encoded per `encoding`.
    pub content: String,
    /// Size in bytes, as reported by the remote host.
    pub size: u64,
    /// Encoding of `content` ("base64" or "utf-8").
    pub encoding: String,
}

/// Commit activity counts over three windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitActivity {
    /// Commits over the trailing 30 days.
    pub commits_30d: u64,
    /// Commits over the trailing year.
    pub commits_1y: u64,
    /// Total commits.
    pub commits_total: u64,
}

/// The remote code-host client's capability set.
///
/// Rate-limit responses are mapped to `Error::RateLimit { retry_after }`;
/// all other transient failures are mapped to `Error::Network`.
#[async_trait]
pub trait CodeHostClient: Send + Sync {
    /// Fetch the complete starred set for `user`.
    async fn get_starred_repos(&self, user: &str) -> Result<Vec<RemoteRepository>>;

    /// Fetch the documented priority paths' content for a repository.
    async fn get_repository_content(
        &self,
        full_name: &str,
        priority_paths: &[String],
    ) -> Result<Vec<RemoteContent>>;

    /// Fetch a repository's core metadata.
    async fn get_repository_metadata(&self, full_name: &str) -> Result<RemoteRepository>;

    /// Fetch a repository's topics.
    async fn get_topics(&self, full_name: &str) -> Result<Vec<String>>;

    /// Fetch the language-bytes breakdown.
    async fn get_languages(&self, full_name: &str) -> Result<BTreeMap<String, u64>>;

    /// Fetch the top contributors.
    async fn get_contributors(&self, full_name: &str) -> Result<Vec<Contributor>>;

    /// Fetch commit activity counts.
    async fn get_commit_activity(&self, full_name: &str) -> Result<CommitActivity>;

    /// Fetch `(open, total)` pull request counts.
    async fn get_pull_counts(&self, full_name: &str) -> Result<(u64, u64)>;

    /// Fetch `(open, total)` issue counts.
    async fn get_issue_counts(&self, full_name: &str) -> Result<(u64, u64)>;

    /// Fetch readable text from a repository's homepage, best-effort.
    async fn get_homepage_text(&self, homepage: &str) -> Result<Option<String>>;
}
