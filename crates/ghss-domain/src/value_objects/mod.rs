//! Value objects: small, immutable data carriers with their own invariants.

mod embedding;

pub use embedding::{cosine_similarity_raw, Embedding};
