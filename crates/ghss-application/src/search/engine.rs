//! `Search` (§4.E): translate a query into a BM25 or cosine lookup against
//! the store, and annotate results with the logical fields that matched.

use std::sync::Arc;

use ghss_domain::entities::Repository;
use ghss_domain::error::{Error, Result};
use ghss_domain::ports::{EmbeddingProvider, Store};

use super::validate::validate_query;

/// Which store query the engine dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Lexical BM25 ranking (`Store::search_bm25`).
    Fuzzy,
    /// Dense cosine similarity (`Store::search_by_embedding`), after
    /// embedding the query text via the embedding provider.
    Vector,
}

/// Options accepted by [`SearchEngine::search`]. CLI-level validation
/// (`--long`/`--short` mutual exclusivity, `--limit` range) happens before
/// this struct is constructed; the engine re-validates the query itself.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub limit: usize,
    pub min_score: f32,
    /// When set, annotate each result with `GetRelatedCounts`.
    pub long: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Fuzzy,
            limit: 10,
            min_score: 0.0,
            long: false,
        }
    }
}

/// A logical field that contained a substring of the lowercased query,
/// with the heuristic weight assigned to that field (§4.E).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: &'static str,
    pub weight: f32,
}

/// One search hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub repository: Repository,
    pub score: f32,
    pub matches: Vec<FieldMatch>,
    /// `(same_org_count, shared_contrib_count)`, populated only when
    /// `opts.long` is set.
    pub related_counts: Option<(u64, u64)>,
}

/// Translates a query string into a store lookup and annotates hits with
/// matched-field metadata.
pub struct SearchEngine {
    store: Arc<dyn Store>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn Store>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    pub async fn search(&self, query: &str, opts: SearchOptions) -> Result<Vec<SearchResult>> {
        validate_query(query)?;
        if opts.limit == 0 || opts.limit > 50 {
            return Err(Error::validation("--limit must be between 1 and 50"));
        }
        let limit = opts.limit;

        let rows = match opts.mode {
            SearchMode::Fuzzy => self.store.search_bm25(query, limit).await?,
            SearchMode::Vector => {
                let embedding = self.embedder.embed(query).await?;
                self.store
                    .search_by_embedding(embedding.values(), limit, opts.min_score)
                    .await?
            }
        };

        let lower_query = query.trim().to_lowercase();
        let mut results = Vec::with_capacity(rows.len());
        for (repository, score) in rows {
            let matches = field_matches(&repository, &lower_query);
            let related_counts = if opts.long {
                Some(self.store.get_related_counts(&repository.full_name).await?)
            } else {
                None
            };
            results.push(SearchResult {
                repository,
                score,
                matches,
                related_counts,
            });
        }
        Ok(results)
    }
}

/// Which logical fields contain `lower_query` as a substring, each with
/// its heuristic weight (§4.E).
fn field_matches(repository: &Repository, lower_query: &str) -> Vec<FieldMatch> {
    let mut matches = Vec::new();

    if repository.full_name.to_lowercase().contains(lower_query) {
        matches.push(FieldMatch { field: "full_name", weight: 1.0 });
    }
    if let Some(purpose) = &repository.purpose {
        if purpose.to_lowercase().contains(lower_query) {
            matches.push(FieldMatch { field: "purpose", weight: 0.9 });
        }
    }
    if let Some(description) = &repository.description {
        if description.to_lowercase().contains(lower_query) {
            matches.push(FieldMatch { field: "description", weight: 0.8 });
        }
    }
    if repository
        .languages
        .keys()
        .any(|lang| lang.to_lowercase().contains(lower_query))
    {
        matches.push(FieldMatch { field: "technologies", weight: 0.8 });
    }
    if let Some(language) = &repository.language {
        if language.to_lowercase().contains(lower_query) {
            matches.push(FieldMatch { field: "language", weight: 0.7 });
        }
    }
    if repository
        .topics
        .iter()
        .any(|topic| topic.to_lowercase().contains(lower_query))
    {
        matches.push(FieldMatch { field: "topics", weight: 0.6 });
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn repo() -> Repository {
        Repository {
            id: "1".to_string(),
            full_name: "gin-gonic/gin".to_string(),
            description: Some("Gin is a HTTP web framework written in Go".to_string()),
            homepage: None,
            language: Some("Go".to_string()),
            stars: 100,
            forks: 10,
            size_kb: 500,
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
            topics: vec!["web".to_string(), "framework".to_string()],
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

    #[test]
    fn full_name_substring_matches_with_weight_one() {
        let matches = field_matches(&repo(), "gin");
        assert!(matches.contains(&FieldMatch { field: "full_name", weight: 1.0 }));
    }

    #[test]
    fn description_substring_matches() {
        let matches = field_matches(&repo(), "web framework");
        assert!(matches.iter().any(|m| m.field == "description"));
    }

    #[test]
    fn topic_substring_matches() {
        let matches = field_matches(&repo(), "framework");
        assert!(matches.iter().any(|m| m.field == "topics"));
    }

    #[test]
    fn unrelated_query_matches_nothing() {
        let matches = field_matches(&repo(), "kubernetes");
        assert!(matches.is_empty());
    }
}
