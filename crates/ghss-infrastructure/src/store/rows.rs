//! Row <-> domain-entity mapping for the DuckDB store, plus the embedding
//! array-literal encoding the `FLOAT[384]` column requires (DuckDB's fixed-
//! size array type cannot be bound through a placeholder parameter, so the
//! literal has to be spliced into the SQL text - safe here because it is
//! built from our own numeric embedding data, never from user input).

use chrono::{DateTime, Utc};
use duckdb::Row;
use std::collections::BTreeMap;

use ghss_domain::constants::DEFAULT_EMBEDDING_DIMENSIONS;
use ghss_domain::entities::{ChunkType, ContentChunk, Contributor, Repository};
use ghss_domain::error::{Error, Result};
use ghss_domain::value_objects::Embedding;

/// Render an embedding as a `[v1, v2, ...]::FLOAT[384]` literal, or the SQL
/// `NULL` literal when absent. Fails if a non-`None` embedding's dimension
/// does not match the column's fixed width.
pub fn embedding_literal(embedding: Option<&Embedding>) -> Result<String> {
    let Some(embedding) = embedding else {
        return Ok("NULL".to_string());
    };
    if embedding.dimensions() != DEFAULT_EMBEDDING_DIMENSIONS {
        return Err(Error::storage(format!(
            "embedding has dimension {}, expected {DEFAULT_EMBEDDING_DIMENSIONS}",
            embedding.dimensions()
        )));
    }
    let mut literal = String::with_capacity(embedding.dimensions() * 10 + 16);
    literal.push('[');
    for (i, v) in embedding.values().iter().enumerate() {
        if i > 0 {
            literal.push_str(", ");
        }
        literal.push_str(&v.to_string());
    }
    literal.push_str(&format!("]::FLOAT[{DEFAULT_EMBEDDING_DIMENSIONS}]"));
    Ok(literal)
}

pub fn chunk_type_to_str(chunk_type: ChunkType) -> &'static str {
    match chunk_type {
        ChunkType::Readme => "readme",
        ChunkType::Code => "code",
        ChunkType::Docs => "docs",
        ChunkType::Config => "config",
        ChunkType::Changelog => "changelog",
        ChunkType::License => "license",
        ChunkType::Package => "package",
    }
}

pub fn chunk_type_from_str(s: &str) -> ChunkType {
    match s {
        "readme" => ChunkType::Readme,
        "code" => ChunkType::Code,
        "config" => ChunkType::Config,
        "changelog" => ChunkType::Changelog,
        "license" => ChunkType::License,
        "package" => ChunkType::Package,
        _ => ChunkType::Docs,
    }
}

/// Column order selected by [`super::REPOSITORY_COLUMNS`] - kept in one
/// place so `row_to_repository` and every `SELECT` agree on layout.
pub const REPOSITORY_COLUMNS: &str = "id, full_name, description, homepage, language, stars, \
    forks, size_kb, created_at, updated_at, last_synced, open_issues, total_issues, open_prs, \
    total_prs, commits_30d, commits_1y, commits_total, topics, languages, contributors, \
    license_name, license_spdx, purpose, purpose_generated_at, summary_version, \
    CAST(embedding AS FLOAT[]) AS embedding, content_hash";

pub fn row_to_repository(row: &Row) -> duckdb::Result<Repository> {
    let topics_json: String = row.get(18)?;
    let languages_json: String = row.get(19)?;
    let contributors_json: String = row.get(20)?;
    let embedding_raw: Option<Vec<f32>> = row.get(26)?;

    let topics: Vec<String> = serde_json::from_str(&topics_json).unwrap_or_default();
    let languages: BTreeMap<String, u64> = serde_json::from_str(&languages_json).unwrap_or_default();
    let contributors: Vec<Contributor> = serde_json::from_str(&contributors_json).unwrap_or_default();
    let embedding = embedding_raw.and_then(Embedding::from_raw);

    Ok(Repository {
        id: row.get(0)?,
        full_name: row.get(1)?,
        description: row.get(2)?,
        homepage: row.get(3)?,
        language: row.get(4)?,
        stars: row.get::<_, i64>(5)? as u64,
        forks: row.get::<_, i64>(6)? as u64,
        size_kb: row.get::<_, i64>(7)? as u64,
        created_at: row.get::<_, DateTime<Utc>>(8)?,
        updated_at: row.get::<_, DateTime<Utc>>(9)?,
        last_synced: row.get::<_, DateTime<Utc>>(10)?,
        open_issues: row.get::<_, i64>(11)? as u64,
        total_issues: row.get::<_, i64>(12)? as u64,
        open_prs: row.get::<_, i64>(13)? as u64,
        total_prs: row.get::<_, i64>(14)? as u64,
        commits_30d: row.get::<_, i64>(15)? as u64,
        commits_1y: row.get::<_, i64>(16)? as u64,
        commits_total: row.get::<_, i64>(17)? as u64,
        topics,
        languages,
        contributors,
        license_name: row.get(21)?,
        license_spdx: row.get(22)?,
        purpose: row.get(23)?,
        purpose_generated_at: row.get::<_, Option<DateTime<Utc>>>(24)?,
        summary_version: row.get::<_, i32>(25)? as u32,
        embedding,
        content_hash: row.get(27)?,
    })
}

pub fn row_to_chunk(row: &Row) -> duckdb::Result<ContentChunk> {
    let chunk_type: String = row.get(1)?;
    Ok(ContentChunk {
        source_path: row.get(0)?,
        chunk_type: chunk_type_from_str(&chunk_type),
        content: row.get(2)?,
        tokens: row.get::<_, i32>(3)? as u32,
        priority: row.get::<_, i16>(4)? as u8,
        label: row.get(5)?,
    })
}
