//! `ProcessRepository` (§4.C) — the content processor's entry point.

use sha2::{Digest, Sha256};

use ghss_domain::constants::MAX_TOTAL_TOKENS;
use ghss_domain::entities::ContentChunk;
use ghss_domain::ports::RemoteContent;

use super::chunker::chunk_file;
use super::classify::{classify, priority};
use super::decode::decode;
use super::filter::filter_entries;

/// Result of processing one repository's raw file content into a
/// token-bounded, priority-sorted chunk set.
#[derive(Debug, Clone, Default)]
pub struct ProcessedRepository {
    /// The accumulated chunk set, ascending by priority.
    pub chunks: Vec<ContentChunk>,
    /// SHA-256 of the ordered chunk set (§4.C step 8).
    pub content_hash: String,
}

/// Process one repository's raw file content (already fetched via the
/// priority-path allow-list, see [`super::paths::priority_paths`]) into a
/// chunk set under the global token budget.
pub fn process_repository(raw_files: Vec<RemoteContent>) -> ProcessedRepository {
    let filtered = filter_entries(raw_files);

    // Decode and classify every surviving file, pairing each with its
    // priority so files (not individual chunks) can be visited in
    // priority order.
    let mut per_file: Vec<(u8, String, String)> = Vec::new();
    for entry in &filtered {
        let Some(text) = decode(entry) else {
            continue;
        };
        let chunk_type = classify(&entry.path);
        let file_priority = priority(&entry.path, chunk_type);
        per_file.push((file_priority, entry.path.clone(), text));
    }
    per_file.sort_by_key(|(p, path, _)| (*p, path.clone()));

    let mut accumulated: Vec<ContentChunk> = Vec::new();
    let mut total_tokens: u64 = 0;
    'files: for (file_priority, path, text) in &per_file {
        let chunk_type = classify(path);
        let chunks = chunk_file(path, text, chunk_type, *file_priority);
        for chunk in chunks {
            if total_tokens >= MAX_TOTAL_TOKENS as u64 {
                break 'files;
            }
            total_tokens += chunk.tokens as u64;
            accumulated.push(chunk);
        }
    }

    accumulated.sort_by_key(|c| c.priority);

    let content_hash = hash_chunks(&accumulated);

    ProcessedRepository {
        chunks: accumulated,
        content_hash,
    }
}

/// SHA-256 of the concatenation of `source || content` over chunks sorted
/// by source path (§4.C step 8). Stable across repeated runs over the
/// same file set regardless of fetch order.
fn hash_chunks(chunks: &[ContentChunk]) -> String {
    let mut sorted: Vec<&ContentChunk> = chunks.iter().collect();
    sorted.sort_by(|a, b| a.source_path.cmp(&b.source_path).then(a.label.cmp(&b.label)));

    let mut hasher = Sha256::new();
    for chunk in sorted {
        hasher.update(chunk.source_path.as_bytes());
        hasher.update(chunk.content.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, content: &str) -> RemoteContent {
        RemoteContent {
            path: path.to_string(),
            file_type: "file".to_string(),
            content: content.to_string(),
            size: content.len() as u64,
            encoding: "utf-8".to_string(),
        }
    }

    #[test]
    fn total_token_budget_is_respected() {
        let big = "x".repeat(300_000); // ~75k tokens, over the 50k budget alone
        let files = vec![entry("README.md", &big), entry("src/main.rs", &big)];
        let processed = process_repository(files);
        let total: u64 = processed.chunks.iter().map(|c| c.tokens as u64).sum();
        assert!(total <= MAX_TOTAL_TOKENS as u64 + 2000); // +1 chunk slack at the boundary
    }

    #[test]
    fn chunk_list_is_sorted_ascending_by_priority() {
        let files = vec![
            entry("src/util.rs", "fn util() {}"),
            entry("README.md", "# Hi"),
        ];
        let processed = process_repository(files);
        let priorities: Vec<u8> = processed.chunks.iter().map(|c| c.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn content_hash_is_stable_across_repeated_runs() {
        let files = vec![entry("README.md", "# Hi"), entry("src/main.rs", "fn main() {}")];
        let a = process_repository(files.clone());
        let b = process_repository(files);
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn content_hash_is_order_independent_in_input() {
        let files_a = vec![entry("README.md", "# Hi"), entry("src/main.rs", "fn main() {}")];
        let files_b = vec![entry("src/main.rs", "fn main() {}"), entry("README.md", "# Hi")];
        let a = process_repository(files_a);
        let b = process_repository(files_b);
        assert_eq!(a.content_hash, b.content_hash);
    }
}
