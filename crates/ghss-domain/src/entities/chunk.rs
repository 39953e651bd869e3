//! The `ContentChunk` entity owned by a single repository.

use serde::{Deserialize, Serialize};

/// Logical classification of a content chunk, derived by the content
/// processor's classification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    /// A README file.
    Readme,
    /// Source code.
    Code,
    /// Documentation outside the README (wiki pages, `docs/`).
    Docs,
    /// A configuration file (`package.json`, `Cargo.toml`, ...).
    Config,
    /// A changelog.
    Changelog,
    /// A license file.
    License,
    /// A package manifest.
    Package,
}

impl ChunkType {
    /// Splitting strategy used by the chunker: markdown-style heading
    /// splitting for prose, function/type-signature splitting for code,
    /// blank-line paragraph splitting otherwise.
    pub fn is_prose(self) -> bool {
        matches!(self, Self::Readme | Self::Docs | Self::Changelog)
    }
}

/// A bounded slice of decoded repository text, owned by exactly one
/// repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Source path the chunk was extracted from.
    pub source_path: String,
    /// Logical chunk type.
    pub chunk_type: ChunkType,
    /// Decoded UTF-8 chunk text.
    pub content: String,
    /// Estimated token count (`ceil(len(bytes) / 4)`), capped at
    /// [`crate::constants::MAX_TOKENS_PER_CHUNK`].
    pub tokens: u32,
    /// Chunk priority: 1 = high, 2 = medium, 3 = low.
    pub priority: u8,
    /// `source#section[.subsection]` label assigned by the chunker.
    pub label: String,
}
