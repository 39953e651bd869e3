//! The four-component relatedness score (§4.F steps 3-4).

use std::collections::HashSet;

use ghss_domain::entities::{Repository, ScoreComponents};
use ghss_domain::value_objects::cosine_similarity_raw;

const WEIGHT_SAME_ORG: f32 = 0.30;
const WEIGHT_TOPIC_OVERLAP: f32 = 0.25;
const WEIGHT_SHARED_CONTRIB: f32 = 0.25;
const WEIGHT_VECTOR_SIM: f32 = 0.20;

const SIGNAL_COUNT: f32 = 4.0;

fn same_org(target: &Repository, candidate: &Repository) -> f32 {
    if target.owner() == candidate.owner() {
        1.0
    } else {
        0.0
    }
}

fn topic_overlap(target: &Repository, candidate: &Repository) -> f32 {
    jaccard(&target.topic_set(), &candidate.topic_set())
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

fn shared_contrib(target: &Repository, candidate: &Repository) -> f32 {
    let a = target.top_contributor_handles();
    let b = candidate.top_contributor_handles();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    if intersection == 0 {
        return 0.0;
    }
    intersection as f32 / a.len().min(b.len()) as f32
}

fn vector_sim(target: &Repository, candidate: &Repository) -> f32 {
    match (&target.embedding, &candidate.embedding) {
        (Some(a), Some(b)) => cosine_similarity_raw(a.values(), b.values()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Compute the weighted, renormalized, coverage-discounted score for one
/// candidate against `target` (§4.F steps 3-4).
pub fn score(target: &Repository, candidate: &Repository) -> ScoreComponents {
    let same_org = same_org(target, candidate);
    let topic_overlap = topic_overlap(target, candidate);
    let shared_contrib = shared_contrib(target, candidate);
    let vector_sim = vector_sim(target, candidate);

    let components = [
        (same_org, WEIGHT_SAME_ORG),
        (topic_overlap, WEIGHT_TOPIC_OVERLAP),
        (shared_contrib, WEIGHT_SHARED_CONTRIB),
        (vector_sim, WEIGHT_VECTOR_SIM),
    ];

    let fired_weight: f32 = components
        .iter()
        .filter(|(value, _)| *value > 0.0)
        .map(|(_, weight)| weight)
        .sum();
    let fired_count = components.iter().filter(|(value, _)| *value > 0.0).count() as f32;

    let final_score = if fired_weight > 0.0 {
        let weighted_sum: f32 = components.iter().map(|(value, weight)| value * weight).sum();
        let renormalized = weighted_sum / fired_weight;
        let coverage_discount = fired_count / SIGNAL_COUNT;
        (renormalized * coverage_discount).clamp(0.0, 1.0)
    } else {
        0.0
    };

    ScoreComponents {
        same_org,
        topic_overlap,
        shared_contrib,
        vector_sim,
        final_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ghss_domain::entities::Contributor;
    use ghss_domain::value_objects::Embedding;

    fn repo(full_name: &str, topics: &[&str]) -> Repository {
        Repository {
            id: "1".to_string(),
            full_name: full_name.to_string(),
            description: None,
            homepage: None,
            language: None,
            stars: 0,
            forks: 0,
            size_kb: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_synced: Utc::now(),
            open_issues: 0,
            total_issues: 0,
            open_prs: 0,
            total_prs: 0,
            commits_30d: 0,
            commits_1y: 0,
            commits_total: 0,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            languages: Default::default(),
            contributors: vec![],
            license_name: None,
            license_spdx: None,
            purpose: None,
            purpose_generated_at: None,
            summary_version: 0,
            embedding: None,
            content_hash: "h".to_string(),
        }
    }

    #[test]
    fn same_org_only_match_scores_exactly_a_quarter() {
        let target = repo("facebook/react", &[]);
        let candidate = repo("facebook/jest", &[]);
        let components = score(&target, &candidate);
        assert_eq!(components.same_org, 1.0);
        assert!((components.final_score - 0.25).abs() < 1e-6);
    }

    #[test]
    fn different_org_and_no_other_signal_scores_zero() {
        let target = repo("facebook/react", &[]);
        let candidate = repo("google/angular", &[]);
        let components = score(&target, &candidate);
        assert_eq!(components.final_score, 0.0);
    }

    #[test]
    fn topic_jaccard_over_shared_and_union_sets() {
        let target = repo("a/a", &["javascript", "react", "frontend"]);
        let candidate = repo("b/b", &["javascript", "vue", "frontend"]);
        let components = score(&target, &candidate);
        assert!((components.topic_overlap - 0.5).abs() < 1e-6);
    }

    #[test]
    fn shared_contributor_overlap_uses_smaller_side() {
        let mut target = repo("a/a", &[]);
        target.contributors = vec![
            Contributor { handle: "alice".to_string(), contributions: 100 },
            Contributor { handle: "bob".to_string(), contributions: 50 },
        ];
        let mut candidate = repo("b/b", &[]);
        candidate.contributors = vec![Contributor { handle: "alice".to_string(), contributions: 10 }];
        let components = score(&target, &candidate);
        assert!((components.shared_contrib - 1.0).abs() < 1e-6);
    }

    #[test]
    fn vector_similarity_uses_both_embeddings_when_present() {
        let mut target = repo("a/a", &[]);
        target.embedding = Embedding::from_raw(vec![1.0, 0.0]);
        let mut candidate = repo("b/b", &[]);
        candidate.embedding = Embedding::from_raw(vec![1.0, 0.0]);
        let components = score(&target, &candidate);
        assert!((components.vector_sim - 1.0).abs() < 1e-3);
    }

    #[test]
    fn final_score_is_always_within_unit_range() {
        let mut target = repo("facebook/react", &["javascript", "react"]);
        target.embedding = Embedding::from_raw(vec![1.0, 0.0]);
        let mut candidate = repo("facebook/jest", &["javascript", "testing"]);
        candidate.embedding = Embedding::from_raw(vec![0.9, 0.1]);
        candidate.contributors = vec![Contributor { handle: "alice".to_string(), contributions: 5 }];
        target.contributors = vec![Contributor { handle: "alice".to_string(), contributions: 5 }];
        let components = score(&target, &candidate);
        assert!((0.0..=1.0).contains(&components.final_score));
    }
}
