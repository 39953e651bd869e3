//! Search engine (§4.E): BM25 lexical search and embedding-based cosine
//! search, with query validation at the application boundary.

mod engine;
mod validate;

pub use engine::{FieldMatch, SearchEngine, SearchMode, SearchOptions, SearchResult};
