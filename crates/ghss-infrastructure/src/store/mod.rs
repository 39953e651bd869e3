//! DuckDB-backed [`Store`] implementation (§4.A).
//!
//! Grounded in the retrieval corpus's `DuckdbVectorRepository` pattern
//! (`other_examples/.../duckdb_vector_repository.rs`): a single
//! `Connection` behind a `tokio::sync::Mutex`, embedded array literals for
//! the fixed-size vector column (DuckDB cannot bind `FLOAT[N]` through a
//! placeholder), and synchronous `duckdb` calls made directly from async
//! methods since a single embedded-engine round trip completes in
//! microseconds - there is no blocking-pool hop to justify.
//!
//! ## The DELETE+INSERT workaround
//!
//! DuckDB has been observed to raise a false duplicate-key error when a
//! DELETE followed by an INSERT against the same primary key runs inside
//! one transaction. `update_repository` and the three single-field
//! `update_repository_*` methods therefore run as two separate
//! auto-committed statements - delete the row and its chunks by `id`,
//! then insert the replacement reusing that `id` - rather than as one
//! transaction. Last-write-wins is accepted: a concurrent reader can
//! briefly observe the row as absent between the two statements.

mod migrator;
mod rows;

use async_trait::async_trait;
use duckdb::{Connection, params};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ghss_domain::constants::DEFAULT_EMBEDDING_DIMENSIONS;
use ghss_domain::entities::{ContentChunk, Contributor, Repository};
use ghss_domain::error::{Error, Result};
use ghss_domain::ports::{MetricsUpdate, RepoStats, Store};
use ghss_domain::value_objects::Embedding;

use rows::{REPOSITORY_COLUMNS, chunk_type_to_str, embedding_literal, row_to_chunk, row_to_repository};

/// A DuckDB-backed [`Store`]. One instance per process; DuckDB allows a
/// single writer connection per database file.
pub struct DuckDbStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (creating if absent) the database file at `path`, or an
    /// in-memory database when `path` is `None`. Does not run migrations;
    /// call [`Store::initialize`] before first use.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let conn = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(Error::Io)?;
                }
                Connection::open(path)
                    .map_err(|err| Error::storage(format!("failed to open database: {err}")))?
            }
            None => Connection::open_in_memory()
                .map_err(|err| Error::storage(format!("failed to open in-memory database: {err}")))?,
        };
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.map(Path::to_path_buf),
        })
    }

    async fn replace_row(&self, repo: &Repository, chunks: &[ContentChunk]) -> Result<()> {
        let embedding_lit = embedding_literal(repo.embedding.as_ref())?;
        let conn = self.conn.lock().await;
        delete_repository_row_by_id(&conn, &repo.id)?;
        insert_repository_row(&conn, repo, chunks, &embedding_lit)?;
        Ok(())
    }
}

fn insert_repository_row(
    conn: &Connection,
    repo: &Repository,
    chunks: &[ContentChunk],
    embedding_lit: &str,
) -> Result<()> {
    let topics_json = serde_json::to_string(&repo.topics)?;
    let languages_json = serde_json::to_string(&repo.languages)?;
    let contributors_json = serde_json::to_string(&repo.contributors)?;

    let sql = format!(
        "INSERT INTO repositories (id, full_name, description, homepage, language, stars, forks, \
         size_kb, created_at, updated_at, last_synced, open_issues, total_issues, open_prs, \
         total_prs, commits_30d, commits_1y, commits_total, topics, languages, contributors, \
         license_name, license_spdx, purpose, purpose_generated_at, summary_version, embedding, \
         content_hash) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, \
         ?, ?, ?, {embedding_lit}, ?)"
    );

    conn.execute(
        &sql,
        params![
            repo.id,
            repo.full_name,
            repo.description,
            repo.homepage,
            repo.language,
            repo.stars as i64,
            repo.forks as i64,
            repo.size_kb as i64,
            repo.created_at,
            repo.updated_at,
            repo.last_synced,
            repo.open_issues as i64,
            repo.total_issues as i64,
            repo.open_prs as i64,
            repo.total_prs as i64,
            repo.commits_30d as i64,
            repo.commits_1y as i64,
            repo.commits_total as i64,
            topics_json,
            languages_json,
            contributors_json,
            repo.license_name,
            repo.license_spdx,
            repo.purpose,
            repo.purpose_generated_at,
            repo.summary_version as i32,
            repo.content_hash,
        ],
    )
    .map_err(|err| Error::storage(format!("failed to insert repository row: {err}")))?;

    let mut stmt = conn
        .prepare(
            "INSERT INTO content_chunks (id, repository_id, source_path, chunk_type, content, \
             tokens, priority, label) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .map_err(|err| Error::storage(format!("failed to prepare chunk insert: {err}")))?;
    for chunk in chunks {
        stmt.execute(params![
            uuid::Uuid::new_v4().to_string(),
            repo.id,
            chunk.source_path,
            chunk_type_to_str(chunk.chunk_type),
            chunk.content,
            chunk.tokens as i32,
            chunk.priority as i16,
            chunk.label,
        ])
        .map_err(|err| Error::storage(format!("failed to insert content chunk: {err}")))?;
    }

    Ok(())
}

fn delete_repository_row_by_id(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM content_chunks WHERE repository_id = ?", params![id])
        .map_err(|err| Error::storage(format!("failed to delete content chunks: {err}")))?;
    conn.execute("DELETE FROM repositories WHERE id = ?", params![id])
        .map_err(|err| Error::storage(format!("failed to delete repository row: {err}")))?;
    Ok(())
}

fn fetch_chunks_for_repo(conn: &Connection, repository_id: &str) -> Result<Vec<ContentChunk>> {
    let mut stmt = conn
        .prepare(
            "SELECT source_path, chunk_type, content, tokens, priority, label FROM content_chunks \
             WHERE repository_id = ? ORDER BY priority ASC, label ASC",
        )
        .map_err(|err| Error::storage(format!("failed to prepare chunk query: {err}")))?;
    let rows = stmt
        .query_map(params![repository_id], row_to_chunk)
        .map_err(|err| Error::storage(format!("failed to query content chunks: {err}")))?;
    let mut chunks = Vec::new();
    for row in rows {
        chunks.push(row.map_err(|err| Error::storage(format!("failed to read chunk row: {err}")))?);
    }
    Ok(chunks)
}

fn vector_literal(vector: &[f32]) -> Result<String> {
    if vector.len() != DEFAULT_EMBEDDING_DIMENSIONS {
        return Err(Error::storage(format!(
            "query vector has dimension {}, expected {DEFAULT_EMBEDDING_DIMENSIONS}",
            vector.len()
        )));
    }
    let mut literal = String::with_capacity(vector.len() * 10 + 16);
    literal.push('[');
    for (i, v) in vector.iter().enumerate() {
        if i > 0 {
            literal.push_str(", ");
        }
        literal.push_str(&v.to_string());
    }
    literal.push_str(&format!("]::FLOAT[{DEFAULT_EMBEDDING_DIMENSIONS}]"));
    Ok(literal)
}

#[async_trait]
impl Store for DuckDbStore {
    async fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        migrator::apply_migrations(&conn)?;
        conn.execute_batch("INSTALL fts; LOAD fts;")
            .map_err(|err| Error::storage(format!("failed to load fts extension: {err}")))?;
        Ok(())
    }

    async fn store_repository(&self, repo: &Repository, chunks: &[ContentChunk]) -> Result<()> {
        let embedding_lit = embedding_literal(repo.embedding.as_ref())?;
        let conn = self.conn.lock().await;
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM repositories WHERE full_name = ?",
                params![repo.full_name],
                |row| row.get(0),
            )
            .ok();
        if exists.is_some() {
            return Err(Error::storage(format!(
                "repository '{}' already exists",
                repo.full_name
            )));
        }
        insert_repository_row(&conn, repo, chunks, &embedding_lit)
    }

    async fn update_repository(&self, repo: &Repository, chunks: &[ContentChunk]) -> Result<()> {
        self.replace_row(repo, chunks).await
    }

    async fn delete_repository(&self, full_name: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM repositories WHERE full_name = ?",
                params![full_name],
                |row| row.get(0),
            )
            .ok();
        let Some(id) = id else {
            return Ok(());
        };
        delete_repository_row_by_id(&conn, &id)
    }

    async fn get_repository(&self, full_name: &str) -> Result<Option<(Repository, Vec<ContentChunk>)>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE full_name = ?");
        let repo: Option<Repository> = conn
            .query_row(&sql, params![full_name], row_to_repository)
            .ok();
        let Some(repo) = repo else {
            return Ok(None);
        };
        let chunks = fetch_chunks_for_repo(&conn, &repo.id)?;
        Ok(Some((repo, chunks)))
    }

    async fn list_repositories(&self, limit: usize, offset: usize) -> Result<Vec<Repository>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {REPOSITORY_COLUMNS} FROM repositories ORDER BY stars DESC, full_name ASC \
             LIMIT ? OFFSET ?"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|err| Error::storage(format!("failed to prepare list query: {err}")))?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], row_to_repository)
            .map_err(|err| Error::storage(format!("failed to list repositories: {err}")))?;
        let mut repos = Vec::new();
        for row in rows {
            repos.push(row.map_err(|err| Error::storage(format!("failed to read repository row: {err}")))?);
        }
        Ok(repos)
    }

    async fn get_stats(&self) -> Result<RepoStats> {
        let conn = self.conn.lock().await;
        let total_repositories: i64 = conn
            .query_row("SELECT COUNT(*) FROM repositories", [], |row| row.get(0))
            .unwrap_or(0);
        let total_chunks: i64 = conn
            .query_row("SELECT COUNT(*) FROM content_chunks", [], |row| row.get(0))
            .unwrap_or(0);
        let last_sync: Option<chrono::DateTime<chrono::Utc>> = conn
            .query_row("SELECT MAX(last_synced) FROM repositories", [], |row| row.get(0))
            .unwrap_or(None);

        let on_disk_mb = self
            .path
            .as_ref()
            .and_then(|path| std::fs::metadata(path).ok())
            .map(|meta| meta.len() as f64 / (1024.0 * 1024.0))
            .unwrap_or(0.0);

        let mut language_histogram: BTreeMap<String, u64> = BTreeMap::new();
        let mut topic_histogram: BTreeMap<String, u64> = BTreeMap::new();
        let mut stmt = conn
            .prepare("SELECT language, topics FROM repositories")
            .map_err(|err| Error::storage(format!("failed to prepare histogram query: {err}")))?;
        let rows = stmt
            .query_map([], |row| {
                let language: Option<String> = row.get(0)?;
                let topics_json: String = row.get(1)?;
                Ok((language, topics_json))
            })
            .map_err(|err| Error::storage(format!("failed to query histograms: {err}")))?;
        for row in rows {
            let (language, topics_json) =
                row.map_err(|err| Error::storage(format!("failed to read histogram row: {err}")))?;
            if let Some(language) = language {
                *language_histogram.entry(language).or_insert(0) += 1;
            }
            let topics: Vec<String> = serde_json::from_str(&topics_json).unwrap_or_default();
            for topic in topics {
                *topic_histogram.entry(topic).or_insert(0) += 1;
            }
        }

        Ok(RepoStats {
            total_repositories: total_repositories as u64,
            total_chunks: total_chunks as u64,
            on_disk_mb,
            last_sync,
            language_histogram,
            topic_histogram,
        })
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("DELETE FROM content_chunks; DELETE FROM repositories;")
            .map_err(|err| Error::storage(format!("failed to clear store: {err}")))
    }

    async fn update_repository_metrics(&self, full_name: &str, metrics: MetricsUpdate) -> Result<()> {
        let Some((mut repo, chunks)) = self.get_repository(full_name).await? else {
            return Err(Error::not_found(full_name.to_string()));
        };
        repo.stars = metrics.stars;
        repo.forks = metrics.forks;
        repo.open_issues = metrics.open_issues;
        repo.total_issues = metrics.total_issues;
        repo.open_prs = metrics.open_prs;
        repo.total_prs = metrics.total_prs;
        repo.commits_30d = metrics.commits_30d;
        repo.commits_1y = metrics.commits_1y;
        repo.commits_total = metrics.commits_total;
        repo.last_synced = chrono::Utc::now();
        self.replace_row(&repo, &chunks).await
    }

    async fn update_repository_embedding(&self, full_name: &str, embedding: Embedding) -> Result<()> {
        let Some((mut repo, chunks)) = self.get_repository(full_name).await? else {
            return Err(Error::not_found(full_name.to_string()));
        };
        repo.embedding = Some(embedding);
        self.replace_row(&repo, &chunks).await
    }

    async fn update_repository_summary(
        &self,
        full_name: &str,
        purpose: String,
        summary_version: u32,
    ) -> Result<()> {
        let Some((mut repo, chunks)) = self.get_repository(full_name).await? else {
            return Err(Error::not_found(full_name.to_string()));
        };
        repo.purpose = Some(purpose);
        repo.purpose_generated_at = Some(chrono::Utc::now());
        repo.summary_version = repo.summary_version.max(summary_version);
        self.replace_row(&repo, &chunks).await
    }

    async fn get_repositories_needing_metrics_update(&self, stale_days: i64) -> Result<Vec<Repository>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE last_synced < now() - INTERVAL (?) DAY"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|err| Error::storage(format!("failed to prepare staleness query: {err}")))?;
        let rows = stmt
            .query_map(params![stale_days], row_to_repository)
            .map_err(|err| Error::storage(format!("failed to query stale repositories: {err}")))?;
        let mut repos = Vec::new();
        for row in rows {
            repos.push(row.map_err(|err| Error::storage(format!("failed to read repository row: {err}")))?);
        }
        Ok(repos)
    }

    async fn get_repositories_needing_summary_update(&self, force: bool) -> Result<Vec<Repository>> {
        let conn = self.conn.lock().await;
        let sql = if force {
            format!("SELECT {REPOSITORY_COLUMNS} FROM repositories")
        } else {
            format!("SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE purpose IS NULL")
        };
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|err| Error::storage(format!("failed to prepare summary query: {err}")))?;
        let rows = stmt
            .query_map([], row_to_repository)
            .map_err(|err| Error::storage(format!("failed to query repositories: {err}")))?;
        let mut repos = Vec::new();
        for row in rows {
            repos.push(row.map_err(|err| Error::storage(format!("failed to read repository row: {err}")))?);
        }
        Ok(repos)
    }

    async fn rebuild_fts_index(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(
            "PRAGMA create_fts_index('repositories', 'id', 'full_name', 'description', \
             'purpose', 'topics', 'language', overwrite=1);",
        )
        .map_err(|err| Error::storage(format!("failed to rebuild fts index: {err}")))?;
        debug!("rebuilt fts index");
        Ok(())
    }

    async fn search_bm25(&self, query: &str, limit: usize) -> Result<Vec<(Repository, f32)>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT * FROM (SELECT {REPOSITORY_COLUMNS}, \
             fts_main_repositories.match_bm25(id, ?) AS __score FROM repositories) t \
             WHERE __score IS NOT NULL ORDER BY __score DESC LIMIT ?"
        );
        let mut stmt = conn.prepare(&sql).map_err(|err| {
            Error::storage(format!(
                "failed to prepare bm25 search (has rebuild_fts_index been called?): {err}"
            ))
        })?;
        let rows = stmt
            .query_map(params![query, limit as i64], |row| {
                let repo = row_to_repository(row)?;
                let score: f32 = row.get(28)?;
                Ok((repo, score))
            })
            .map_err(|err| Error::storage(format!("failed to run bm25 search: {err}")))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|err| Error::storage(format!("failed to read bm25 row: {err}")))?);
        }
        Ok(results)
    }

    async fn search_by_embedding(
        &self,
        vector: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<(Repository, f32)>> {
        let literal = vector_literal(vector)?;
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT * FROM (SELECT {REPOSITORY_COLUMNS}, \
             GREATEST(array_cosine_similarity(embedding, {literal}), 0.0) AS __score \
             FROM repositories WHERE embedding IS NOT NULL) t \
             ORDER BY __score DESC"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|err| Error::storage(format!("failed to prepare vector search: {err}")))?;
        let rows = stmt
            .query_map([], |row| {
                let repo = row_to_repository(row)?;
                let score: f32 = row.get(28)?;
                Ok((repo, score))
            })
            .map_err(|err| Error::storage(format!("failed to run vector search: {err}")))?;

        let mut results = Vec::new();
        for row in rows {
            let (repo, score) =
                row.map_err(|err| Error::storage(format!("failed to read vector search row: {err}")))?;
            if score >= min_score {
                results.push((repo, score));
            }
            if results.len() >= limit {
                break;
            }
        }
        Ok(results)
    }

    async fn get_related_counts(&self, full_name: &str) -> Result<(u64, u64)> {
        let Some((target, _)) = self.get_repository(full_name).await? else {
            return Err(Error::not_found(full_name.to_string()));
        };
        let owner = format!("{}/", target.owner());
        let target_contributors = target.top_contributor_handles();

        let conn = self.conn.lock().await;
        let same_org_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM repositories WHERE full_name != ? AND starts_with(full_name, ?)",
                params![full_name, owner],
                |row| row.get(0),
            )
            .map_err(|err| Error::storage(format!("failed to count same-org repositories: {err}")))?;

        let mut stmt = conn
            .prepare("SELECT contributors FROM repositories WHERE full_name != ?")
            .map_err(|err| Error::storage(format!("failed to prepare contributor scan: {err}")))?;
        let rows = stmt
            .query_map(params![full_name], |row| row.get::<_, String>(0))
            .map_err(|err| Error::storage(format!("failed to scan contributors: {err}")))?;

        let mut shared_contrib_count = 0u64;
        for row in rows {
            let contributors_json =
                row.map_err(|err| Error::storage(format!("failed to read contributor row: {err}")))?;
            let contributors: Vec<Contributor> =
                serde_json::from_str(&contributors_json).unwrap_or_default();
            let handles: std::collections::HashSet<String> =
                contributors.iter().map(|c| c.handle.to_lowercase()).collect();
            if !target_contributors.is_empty() && handles.intersection(&target_contributors).next().is_some() {
                shared_contrib_count += 1;
            }
        }

        Ok((same_org_count as u64, shared_contrib_count))
    }

    async fn close(&self) -> Result<()> {
        // `duckdb::Connection` releases its file handle on drop; there is
        // no separate resource to release while other `Arc` clones may
        // still be live.
        warn!("store close() is a no-op; connection closes on drop");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_repo(full_name: &str, stars: u64) -> Repository {
        Repository {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: full_name.to_string(),
            description: Some("a test repository".to_string()),
            homepage: None,
            language: Some("Go".to_string()),
            stars,
            forks: 0,
            size_kb: 10,
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
            topics: vec!["web".to_string()],
            languages: BTreeMap::new(),
            contributors: vec![],
            license_name: None,
            license_spdx: None,
            purpose: None,
            purpose_generated_at: None,
            summary_version: 1,
            embedding: None,
            content_hash: "deadbeef".to_string(),
        }
    }

    async fn open_test_store() -> DuckDbStore {
        let store = DuckDbStore::open(None).unwrap();
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn round_trip_preserves_scalar_fields() {
        let store = open_test_store().await;
        let repo = sample_repo("gin-gonic/gin", 100);
        store.store_repository(&repo, &[]).await.unwrap();
        let (fetched, _) = store.get_repository(&repo.full_name).await.unwrap().unwrap();
        assert_eq!(fetched.full_name, repo.full_name);
        assert_eq!(fetched.stars, repo.stars);
        assert_eq!(fetched.topics, repo.topics);
    }

    #[tokio::test]
    async fn list_repositories_orders_by_stars_desc_then_name_asc() {
        let store = open_test_store().await;
        store.store_repository(&sample_repo("b/one", 10), &[]).await.unwrap();
        store.store_repository(&sample_repo("a/two", 10), &[]).await.unwrap();
        store.store_repository(&sample_repo("c/three", 50), &[]).await.unwrap();
        let repos = store.list_repositories(10, 0).await.unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["c/three", "a/two", "b/one"]);
    }

    #[tokio::test]
    async fn update_repository_survives_the_delete_insert_workaround() {
        let store = open_test_store().await;
        let mut repo = sample_repo("facebook/react", 100);
        store.store_repository(&repo, &[]).await.unwrap();
        repo.stars = 200;
        store.update_repository(&repo, &[]).await.unwrap();
        let (fetched, _) = store.get_repository(&repo.full_name).await.unwrap().unwrap();
        assert_eq!(fetched.stars, 200);
        assert_eq!(fetched.id, repo.id);
    }

    #[tokio::test]
    async fn bm25_search_finds_stored_repository_after_rebuild() {
        let store = open_test_store().await;
        let repo = sample_repo("gin-gonic/gin", 100);
        store.store_repository(&repo, &[]).await.unwrap();
        store.rebuild_fts_index().await.unwrap();
        let results = store.search_bm25("test", 10).await.unwrap();
        assert!(results.iter().any(|(r, _)| r.full_name == "gin-gonic/gin"));
    }

    #[tokio::test]
    async fn clear_removes_all_rows() {
        let store = open_test_store().await;
        store.store_repository(&sample_repo("a/b", 1), &[]).await.unwrap();
        store.clear().await.unwrap();
        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_repositories, 0);
    }
}
