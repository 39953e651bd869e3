//! Human-readable explanation text for a related candidate (§4.F step 7).

use ghss_domain::entities::{Repository, ScoreComponents};

const MAX_NAMED_ITEMS: usize = 3;

fn join_with_truncation(items: &[String]) -> String {
    if items.len() <= MAX_NAMED_ITEMS {
        items.join(", ")
    } else {
        format!("{}, …", items[..MAX_NAMED_ITEMS].join(", "))
    }
}

/// Build the explanation string from the non-zero components, in the
/// fixed order `org → topics → contributors → vector`.
pub fn explain(target: &Repository, candidate: &Repository, scores: &ScoreComponents) -> String {
    let mut parts = Vec::new();

    if scores.same_org > 0.0 {
        parts.push(format!("shared org '{}'", target.owner()));
    }

    if scores.topic_overlap > 0.0 {
        let mut shared: Vec<String> = target
            .topic_set()
            .intersection(&candidate.topic_set())
            .cloned()
            .collect();
        shared.sort();
        parts.push(format!("shared topics: {}", join_with_truncation(&shared)));
    }

    if scores.shared_contrib > 0.0 {
        let mut shared: Vec<String> = target
            .top_contributor_handles()
            .intersection(&candidate.top_contributor_handles())
            .cloned()
            .collect();
        shared.sort();
        parts.push(format!(
            "shared contributors: {}",
            join_with_truncation(&shared)
        ));
    }

    if scores.vector_sim > 0.0 {
        parts.push(format!("similar description ({:.2} cosine)", scores.vector_sim));
    }

    if parts.is_empty() {
        return "no matching signals".to_string();
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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
    fn same_org_explanation_names_the_owner() {
        let target = repo("facebook/react", &[]);
        let candidate = repo("facebook/jest", &[]);
        let scores = ScoreComponents {
            same_org: 1.0,
            topic_overlap: 0.0,
            shared_contrib: 0.0,
            vector_sim: 0.0,
            final_score: 0.25,
        };
        let text = explain(&target, &candidate, &scores);
        assert!(text.contains("shared org 'facebook'"));
    }

    #[test]
    fn no_signals_reports_no_matching_signals() {
        let target = repo("a/a", &[]);
        let candidate = repo("b/b", &[]);
        let scores = ScoreComponents::default();
        assert_eq!(explain(&target, &candidate, &scores), "no matching signals");
    }
}
