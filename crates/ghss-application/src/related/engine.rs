//! `FindRelated` (§4.F): stream candidates in pages, score each against
//! the target, and keep a bounded top-buffer.

use std::sync::Arc;

use ghss_domain::constants::{RELATED_BUFFER_SIZE, RELATED_MIN_SCORE};
use ghss_domain::entities::RelatedCandidate;
use ghss_domain::error::{Error, Result};
use ghss_domain::ports::Store;

use super::explain::explain;
use super::scoring::score;

const PAGE_SIZE: usize = 100;

/// Streams candidates from the store, scores them against a target, and
/// returns the top `limit` by final score.
pub struct RelatednessEngine {
    store: Arc<dyn Store>,
}

impl RelatednessEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_related(&self, full_name: &str, limit: usize) -> Result<Vec<RelatedCandidate>> {
        let Some((target, _)) = self.store.get_repository(full_name).await? else {
            return Err(Error::not_found(full_name));
        };

        let mut buffer: Vec<RelatedCandidate> = Vec::with_capacity(RELATED_BUFFER_SIZE + 1);
        let mut offset = 0usize;

        loop {
            let page = self.store.list_repositories(PAGE_SIZE, offset).await?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len();

            for candidate in page {
                if candidate.full_name == target.full_name {
                    continue;
                }
                let scores = score(&target, &candidate);
                if scores.final_score < RELATED_MIN_SCORE {
                    continue;
                }
                let explanation = explain(&target, &candidate, &scores);
                buffer.push(RelatedCandidate {
                    repository: candidate,
                    scores,
                    explanation,
                });
                if buffer.len() > RELATED_BUFFER_SIZE {
                    sort_descending(&mut buffer);
                    buffer.truncate(RELATED_BUFFER_SIZE);
                }
            }

            offset += page_len;
            if page_len < PAGE_SIZE {
                break;
            }
        }

        sort_descending(&mut buffer);
        buffer.truncate(limit);
        Ok(buffer)
    }
}

fn sort_descending(buffer: &mut [RelatedCandidate]) {
    buffer.sort_by(|a, b| {
        b.scores
            .final_score
            .partial_cmp(&a.scores.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use ghss_domain::entities::{ContentChunk, Repository};
    use ghss_domain::ports::{MetricsUpdate, RepoStats};
    use ghss_domain::value_objects::Embedding;

    struct FakeStore {
        repos: Vec<Repository>,
    }

    fn repo(full_name: &str, topics: &[&str]) -> Repository {
        Repository {
            id: full_name.to_string(),
            full_name: full_name.to_string(),
            description: None,
            homepage: None,
            language: None,
            stars: 0,
            forks: 0,
            size_kb: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_synced: Utc::now(),
            open_issues: 0,
            total_issues: 0,
            open_prs: 0,
            total_prs: 0,
            commits_30d: 0,
            commits_1y: 0,
            commits_total: 0,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            languages: Default::default(),
            contributors: vec![],
            license_name: None,
            license_spdx: None,
            purpose: None,
            purpose_generated_at: None,
            summary_version: 0,
            embedding: None,
            content_hash: "h".to_string(),
        }
    }

    #[async_trait]
    impl Store for FakeStore {
        async fn initialize(&self) -> Result<()> {
            Ok(())
        }
        async fn store_repository(&self, _repo: &Repository, _chunks: &[ContentChunk]) -> Result<()> {
            unimplemented!()
        }
        async fn update_repository(&self, _repo: &Repository, _chunks: &[ContentChunk]) -> Result<()> {
            unimplemented!()
        }
        async fn delete_repository(&self, _full_name: &str) -> Result<()> {
            unimplemented!()
        }
        async fn get_repository(
            &self,
            full_name: &str,
        ) -> Result<Option<(Repository, Vec<ContentChunk>)>> {
            Ok(self
                .repos
                .iter()
                .find(|r| r.full_name == full_name)
                .cloned()
                .map(|r| (r, Vec::new())))
        }
        async fn list_repositories(&self, limit: usize, offset: usize) -> Result<Vec<Repository>> {
            Ok(self.repos.iter().skip(offset).take(limit).cloned().collect())
        }
        async fn get_stats(&self) -> Result<RepoStats> {
            unimplemented!()
        }
        async fn clear(&self) -> Result<()> {
            unimplemented!()
        }
        async fn update_repository_metrics(&self, _full_name: &str, _metrics: MetricsUpdate) -> Result<()> {
            unimplemented!()
        }
        async fn update_repository_embedding(&self, _full_name: &str, _embedding: Embedding) -> Result<()> {
            unimplemented!()
        }
        async fn update_repository_summary(
            &self,
            _full_name: &str,
            _purpose: String,
            _summary_version: u32,
        ) -> Result<()> {
            unimplemented!()
        }
        async fn get_repositories_needing_metrics_update(&self, _stale_days: i64) -> Result<Vec<Repository>> {
            unimplemented!()
        }
        async fn get_repositories_needing_summary_update(&self, _force: bool) -> Result<Vec<Repository>> {
            unimplemented!()
        }
        async fn rebuild_fts_index(&self) -> Result<()> {
            unimplemented!()
        }
        async fn search_bm25(&self, _query: &str, _limit: usize) -> Result<Vec<(Repository, f32)>> {
            unimplemented!()
        }
        async fn search_by_embedding(
            &self,
            _vector: &[f32],
            _limit: usize,
            _min_score: f32,
        ) -> Result<Vec<(Repository, f32)>> {
            unimplemented!()
        }
        async fn get_related_counts(&self, _full_name: &str) -> Result<(u64, u64)> {
            unimplemented!()
        }
        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn target_never_appears_in_its_own_related_list() {
        let store = FakeStore {
            repos: vec![
                repo("facebook/react", &["javascript"]),
                repo("facebook/jest", &["javascript"]),
            ],
        };
        let engine = RelatednessEngine::new(Arc::new(store));
        let results = engine.find_related("facebook/react", 5).await.unwrap();
        assert!(results.iter().all(|c| c.repository.full_name != "facebook/react"));
    }

    #[tokio::test]
    async fn results_are_sorted_descending_by_final_score() {
        let store = FakeStore {
            repos: vec![
                repo("facebook/react", &["javascript", "ui"]),
                repo("facebook/jest", &["javascript"]),
                repo("facebook/flow", &["javascript", "ui"]),
            ],
        };
        let engine = RelatednessEngine::new(Arc::new(store));
        let results = engine.find_related("facebook/react", 5).await.unwrap();
        let scores: Vec<f32> = results.iter().map(|c| c.scores.final_score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(scores, sorted);
    }

    #[tokio::test]
    async fn unrelated_candidate_below_threshold_is_excluded() {
        let store = FakeStore {
            repos: vec![repo("facebook/react", &[]), repo("google/angular", &[])],
        };
        let engine = RelatednessEngine::new(Arc::new(store));
        let results = engine.find_related("facebook/react", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let store = FakeStore { repos: vec![] };
        let engine = RelatednessEngine::new(Arc::new(store));
        let result = engine.find_related("nope/nope", 5).await;
        assert!(result.is_err());
    }
}
