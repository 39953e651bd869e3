//! Domain layer for gh-star-search.
//!
//! Pure business types: repository/chunk entities, value objects, the
//! error taxonomy, shared constants, and the port traits (`Store`,
//! `CodeHostClient`, `EmbeddingProvider`) that the application layer
//! depends on and the infrastructure/providers layers implement.

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::{
    ContentChunk, ChunkType, RelatedCandidate, Repository, ScoreComponents, SyncPlan, SyncStats,
};
pub use error::{Error, Result};
pub use value_objects::Embedding;
