//! Transient sync-pipeline records: the plan produced by diffing remote vs.
//! local state, and the statistics accumulated while executing it.

use std::sync::Mutex;

use crate::ports::RemoteRepository;

/// A transient triple produced by diffing the remote starred set against
/// local state. Never persisted. `to_add`/`to_update` carry the raw remote
/// metadata — local `Repository` values (with an assigned `id`, chunks,
/// and an embedding) only come into existence once each entry has gone
/// through the content processor and embedding adapter.
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Repositories present remotely but absent locally.
    pub to_add: Vec<RemoteRepository>,
    /// Repositories present in both sets whose content or metadata
    /// requires a local update.
    pub to_update: Vec<RemoteRepository>,
    /// Repositories present locally but absent remotely.
    pub to_remove: Vec<String>,
}

/// Counters accumulated over the course of a sync run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncCounts {
    /// Total repositories considered (add + update + remove + skip).
    pub total_repos: u64,
    /// Newly added repositories.
    pub new_repos: u64,
    /// Updated repositories.
    pub updated_repos: u64,
    /// Removed repositories.
    pub removed_repos: u64,
    /// Repositories left untouched (no content or metadata change).
    pub skipped_repos: u64,
    /// Repositories that failed and were counted rather than aborting
    /// the batch.
    pub error_repos: u64,
    /// Repositories successfully processed (stored or updated).
    pub processed_repos: u64,
    /// Repositories whose `content_hash` changed.
    pub content_changes: u64,
    /// Repositories whose metadata (stars/forks/size/description/topics/
    /// license/homepage) changed without a content change.
    pub metadata_changes: u64,
}

impl SyncCounts {
    /// `processed_repos + error_repos`, used by cancellation tests to
    /// confirm a batch stopped early.
    pub fn completed_or_errored(&self) -> u64 {
        self.processed_repos + self.error_repos
    }
}

/// Statistics accumulated over the course of a sync run, updated through a
/// single mutex-guarded increment method so that concurrent worker tasks
/// can update them race-free without a separate lock per field.
#[derive(Debug, Default)]
pub struct SyncStats {
    inner: Mutex<SyncCounts>,
}

impl SyncStats {
    /// Apply `f` to the guarded counters under the lock.
    pub fn increment(&self, f: impl FnOnce(&mut SyncCounts)) {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }

    /// Snapshot the current counters.
    pub fn snapshot(&self) -> SyncCounts {
        *self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counters_are_race_free_under_concurrent_increment() {
        let stats = Arc::new(SyncStats::default());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.increment(|c| c.processed_repos += 1);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.snapshot().processed_repos, 800);
    }
}
