//! Diffing the remote starred set against local state (§4.D step 3).

use std::collections::HashMap;

use ghss_domain::entities::{Repository, SyncPlan};
use ghss_domain::ports::RemoteRepository;

/// Whether `remote`'s metadata differs from `local` enough to warrant an
/// update even without a content change (used both here, to build the
/// plan, and by [`super::pipeline`] to classify the store call as an
/// update vs. a no-op).
pub fn metadata_changed(remote: &RemoteRepository, local: &Repository) -> bool {
    remote.stars != local.stars
        || remote.forks != local.forks
        || remote.size_kb != local.size_kb
        || remote.description != local.description
        || topic_set(&remote.topics) != topic_set(&local.topics)
        || remote.license_name != local.license_name
        || remote.license_spdx != local.license_spdx
        || remote.homepage != local.homepage
}

fn topic_set(topics: &[String]) -> std::collections::HashSet<String> {
    topics.iter().map(|t| t.to_lowercase()).collect()
}

/// Build the sync plan by diffing the remote starred set against the
/// locally stored repositories (§4.D step 3).
pub fn build_plan(
    remote: Vec<RemoteRepository>,
    local: &HashMap<String, Repository>,
    force: bool,
) -> SyncPlan {
    let mut plan = SyncPlan::default();
    let mut remote_names = std::collections::HashSet::with_capacity(remote.len());

    for remote_repo in remote {
        remote_names.insert(remote_repo.full_name.clone());
        match local.get(&remote_repo.full_name) {
            None => plan.to_add.push(remote_repo),
            Some(local_repo) => {
                let needs_update = force
                    || remote_repo.updated_at > local_repo.last_synced
                    || metadata_changed(&remote_repo, local_repo);
                if needs_update {
                    plan.to_update.push(remote_repo);
                }
            }
        }
    }

    plan.to_remove = local
        .keys()
        .filter(|name| !remote_names.contains(*name))
        .cloned()
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn remote(full_name: &str, stars: u64, updated_at: chrono::DateTime<Utc>) -> RemoteRepository {
        RemoteRepository {
            full_name: full_name.to_string(),
            description: None,
            homepage: None,
            language: None,
            stars,
            forks: 0,
            size_kb: 0,
            created_at: Utc::now(),
            updated_at,
            topics: vec![],
            languages: Default::default(),
            contributors: vec![],
            license_name: None,
            license_spdx: None,
        }
    }

    fn local(full_name: &str, stars: u64, last_synced: chrono::DateTime<Utc>) -> Repository {
        Repository {
            id: "id-1".to_string(),
            full_name: full_name.to_string(),
            description: None,
            homepage: None,
            language: None,
            stars,
            forks: 0,
            size_kb: 0,
            created_at: last_synced,
            updated_at: last_synced,
            last_synced,
            open_issues: 0,
            total_issues: 0,
            open_prs: 0,
            total_prs: 0,
            commits_30d: 0,
            commits_1y: 0,
            commits_total: 0,
            topics: vec![],
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
    fn new_remote_repo_is_added() {
        let remote_set = vec![remote("a/b", 1, Utc::now())];
        let plan = build_plan(remote_set, &HashMap::new(), false);
        assert_eq!(plan.to_add.len(), 1);
        assert!(plan.to_update.is_empty());
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn unchanged_repo_is_a_no_op() {
        let synced = Utc::now();
        let remote_set = vec![remote("a/b", 5, synced)];
        let mut local_map = HashMap::new();
        local_map.insert("a/b".to_string(), local("a/b", 5, synced));
        let plan = build_plan(remote_set, &local_map, false);
        assert!(plan.to_add.is_empty());
        assert!(plan.to_update.is_empty());
    }

    #[test]
    fn star_count_change_triggers_update() {
        let synced = Utc::now();
        let remote_set = vec![remote("a/b", 50, synced)];
        let mut local_map = HashMap::new();
        local_map.insert("a/b".to_string(), local("a/b", 5, synced));
        let plan = build_plan(remote_set, &local_map, false);
        assert_eq!(plan.to_update.len(), 1);
    }

    #[test]
    fn local_only_repo_is_removed() {
        let synced = Utc::now();
        let mut local_map = HashMap::new();
        local_map.insert("a/b".to_string(), local("a/b", 5, synced));
        let plan = build_plan(vec![], &local_map, false);
        assert_eq!(plan.to_remove, vec!["a/b".to_string()]);
    }

    #[test]
    fn force_updates_every_repo_even_without_changes() {
        let synced = Utc::now();
        let remote_set = vec![remote("a/b", 5, synced)];
        let mut local_map = HashMap::new();
        local_map.insert("a/b".to_string(), local("a/b", 5, synced));
        let plan = build_plan(remote_set, &local_map, true);
        assert_eq!(plan.to_update.len(), 1);
    }
}
