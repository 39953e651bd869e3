//! Content extraction & chunking (§4.C).

mod chunker;
mod classify;
mod decode;
mod filter;
mod paths;
mod processor;

pub use chunker::estimate_tokens;
pub use paths::priority_paths;
pub use processor::{ProcessedRepository, process_repository};
