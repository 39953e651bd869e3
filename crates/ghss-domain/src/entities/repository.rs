//! The `Repository` entity — a single starred GitHub repository as stored
//! in the local analytical database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value_objects::Embedding;

/// A single contributor's handle and contribution count, as tracked per
/// repository (top contributors only, ordered by contribution count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    /// The contributor's code-host handle.
    pub handle: String,
    /// Number of contributions attributed to this handle.
    pub contributions: u64,
}

/// A starred repository.
///
/// `full_name` (`owner/name`) is the natural key; `id` is a stable opaque
/// identifier assigned on first insert and reused across updates so the
/// DELETE+INSERT workaround in the store (see the store module) can
/// preserve referential identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Stable opaque identifier, assigned on first insert.
    pub id: String,
    /// `owner/name`, unique across the store.
    pub full_name: String,
    /// Repository description, if set.
    pub description: Option<String>,
    /// Homepage URL, if set.
    pub homepage: Option<String>,
    /// Primary language as reported by the code host.
    pub language: Option<String>,
    /// Star count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
    /// Repository size in KB.
    pub size_kb: u64,
    /// Repository creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last time the repository's metadata changed upstream.
    pub updated_at: DateTime<Utc>,
    /// Last time this repository was synced locally. Invariant:
    /// `last_synced >= created_at`.
    pub last_synced: DateTime<Utc>,
    /// Number of currently open issues.
    pub open_issues: u64,
    /// Total issue count (open + closed) observed at last sync.
    pub total_issues: u64,
    /// Number of currently open pull requests.
    pub open_prs: u64,
    /// Total pull request count observed at last sync.
    pub total_prs: u64,
    /// Commit count over the trailing 30 days.
    pub commits_30d: u64,
    /// Commit count over the trailing year.
    pub commits_1y: u64,
    /// Total commit count.
    pub commits_total: u64,
    /// Ordered sequence of topics, order preserved from the code host.
    pub topics: Vec<String>,
    /// Bytes of code per language, as reported by the code host.
    pub languages: BTreeMap<String, u64>,
    /// Ordered sequence of top contributors.
    pub contributors: Vec<Contributor>,
    /// License display name (e.g. "MIT License").
    pub license_name: Option<String>,
    /// License SPDX identifier (e.g. "MIT").
    pub license_spdx: Option<String>,
    /// AI-generated purpose summary.
    pub purpose: Option<String>,
    /// Timestamp the purpose summary was generated.
    pub purpose_generated_at: Option<DateTime<Utc>>,
    /// Monotonically non-decreasing version of the purpose summary.
    pub summary_version: u32,
    /// L2-normalized semantic embedding, if one has been generated.
    pub embedding: Option<Embedding>,
    /// SHA-256 hash of the ordered chunk set; the sole content change
    /// indicator.
    pub content_hash: String,
}

impl Repository {
    /// Owner prefix (the substring before `/` in `full_name`), used by the
    /// relatedness engine's same-org signal.
    pub fn owner(&self) -> &str {
        self.full_name
            .split_once('/')
            .map_or(self.full_name.as_str(), |(owner, _)| owner)
    }

    /// Lowercase topic set, used by the relatedness engine's Jaccard
    /// signal.
    pub fn topic_set(&self) -> std::collections::HashSet<String> {
        self.topics.iter().map(|t| t.to_lowercase()).collect()
    }

    /// Top-10 contributors by contribution count, lowercase handle set.
    pub fn top_contributor_handles(&self) -> std::collections::HashSet<String> {
        let mut sorted = self.contributors.clone();
        sorted.sort_by(|a, b| b.contributions.cmp(&a.contributions));
        sorted
            .into_iter()
            .take(10)
            .map(|c| c.handle.to_lowercase())
            .collect()
    }
}
