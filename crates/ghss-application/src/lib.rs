//! Application layer for gh-star-search.
//!
//! Orchestrates the domain ports into four use cases: the content
//! processor, the sync pipeline, the search engine and the relatedness
//! engine. No concrete adapters live here — those belong
//! to `ghss-providers` (remote client, embedding adapter) and
//! `ghss-infrastructure` (store).

pub mod content;
pub mod related;
pub mod search;
pub mod sync;

pub use content::{ProcessedRepository, process_repository};
pub use related::RelatednessEngine;
pub use search::{FieldMatch, SearchEngine, SearchMode, SearchOptions, SearchResult};
pub use sync::{PipelineDeps, SyncPipeline};
