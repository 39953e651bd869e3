//! Core entities: repositories, content chunks, transient sync/relatedness
//! records.

mod chunk;
mod related;
mod repository;
mod sync;

pub use chunk::{ChunkType, ContentChunk};
pub use related::{RelatedCandidate, ScoreComponents};
pub use repository::{Contributor, Repository};
pub use sync::{SyncPlan, SyncStats};
