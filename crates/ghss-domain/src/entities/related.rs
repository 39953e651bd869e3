//! Transient relatedness-engine records.

use crate::entities::Repository;

/// Per-signal breakdown of a relatedness score, each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreComponents {
    /// 1.0 iff the candidate shares the target's owner prefix, else 0.0.
    pub same_org: f32,
    /// Jaccard similarity over lowercase topic sets.
    pub topic_overlap: f32,
    /// `|A∩B| / min(|A|,|B|)` over top-10 contributors.
    pub shared_contrib: f32,
    /// Cosine similarity over embeddings, clamped to `[0, 1]`.
    pub vector_sim: f32,
    /// Final weighted, coverage-discounted score in `[0, 1]`.
    pub final_score: f32,
}

/// A transient record pairing a candidate repository with its score
/// breakdown and a human-readable explanation.
#[derive(Debug, Clone)]
pub struct RelatedCandidate {
    /// The candidate repository.
    pub repository: Repository,
    /// Score breakdown.
    pub scores: ScoreComponents,
    /// Human-readable explanation naming the signals that fired.
    pub explanation: String,
}
