//! Semantic embedding value object.
//!
//! Represents an L2-normalized vector embedding of a repository's
//! name/description/summary/topics, of a fixed dimension `D` (typically
//! 384). Normalization is enforced at construction so every stored
//! embedding can be compared with a plain dot product.

use serde::{Deserialize, Serialize};

/// An L2-normalized semantic embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// The embedding vector values, L2-normalized.
    vector: Vec<f32>,
}

impl Embedding {
    /// Build an embedding from a raw vector, normalizing it to unit L2
    /// length. Returns `None` for an empty vector or a zero vector (which
    /// cannot be normalized).
    pub fn from_raw(vector: Vec<f32>) -> Option<Self> {
        if vector.is_empty() {
            return None;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return None;
        }
        Some(Self {
            vector: vector.into_iter().map(|v| v / norm).collect(),
        })
    }

    /// Dimension of this embedding.
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Borrow the underlying L2-normalized values.
    pub fn values(&self) -> &[f32] {
        &self.vector
    }

    /// Cosine similarity between two embeddings. Since both sides are
    /// L2-normalized this reduces to a plain dot product. Returns `0.0`
    /// if the dimensions differ (callers compare embeddings from the same
    /// model; a mismatch means the data is stale, not a crash).
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.vector.len() != other.vector.len() {
            return 0.0;
        }
        self.vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Cosine similarity between two raw (not necessarily normalized) vectors,
/// clamped so negative similarity reads as zero. Used by the store, which
/// deals in raw `Vec<f32>` columns rather than `Embedding` values.
pub fn cosine_similarity_raw(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_normalizes_to_unit_length() {
        let e = Embedding::from_raw(vec![3.0, 4.0]).unwrap();
        let norm: f32 = e.values().iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_rejected() {
        assert!(Embedding::from_raw(vec![0.0, 0.0]).is_none());
    }

    #[test]
    fn identical_embeddings_have_similarity_one() {
        let e = Embedding::from_raw(vec![1.0, 2.0, 3.0]).unwrap();
        assert!((e.cosine_similarity(&e) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn negative_similarity_clamps_to_zero_in_raw_helper() {
        let sim = cosine_similarity_raw(&[1.0, 0.0], &[-1.0, 0.0]);
        assert_eq!(sim, 0.0);
    }
}
