//! Content filtering (§4.C step 2): drop entries too large to be useful,
//! non-file entries, test/example paths, binary-ish extensions, and paths
//! under excluded directory prefixes.

use ghss_domain::ports::RemoteContent;

const MAX_SIZE_BYTES: u64 = ghss_domain::constants::MAX_CONTENT_FILE_BYTES;

const TEST_SUBSTRINGS: &[&str] = &["test", "tests", "_test", "spec", "specs", "__tests__"];

const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp", "tiff",
    // audio/video
    "mp3", "mp4", "wav", "avi", "mov", "mkv", "flac", "ogg",
    // archives
    "zip", "tar", "gz", "tgz", "7z", "rar", "bz2", "xz",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // misc binary
    "pdf", "exe", "dll", "so", "dylib", "bin", "class", "jar", "whl", "wasm",
];

const EXCLUDED_DIR_PREFIXES: &[&str] = &[
    "node_modules/",
    "vendor/",
    "build/",
    "dist/",
    "target/",
    "bin/",
    "obj/",
    ".git/",
    "__pycache__/",
    ".venv/",
    "venv/",
    "coverage/",
    ".next/",
    ".nuxt/",
    "examples/",
    "example/",
    "demo/",
    "demos/",
];

/// Whether `path` looks like a test fixture by the documented substring
/// rule.
fn looks_like_test_path(lower_path: &str) -> bool {
    TEST_SUBSTRINGS.iter().any(|needle| lower_path.contains(needle))
}

/// Whether `path` carries one of the enumerated binary/media extensions.
fn has_binary_extension(lower_path: &str) -> bool {
    lower_path
        .rsplit_once('.')
        .is_some_and(|(_, ext)| BINARY_EXTENSIONS.contains(&ext))
}

/// Whether `path` sits under one of the excluded directory prefixes.
fn under_excluded_dir(lower_path: &str) -> bool {
    EXCLUDED_DIR_PREFIXES
        .iter()
        .any(|prefix| lower_path.starts_with(prefix) || lower_path.contains(&format!("/{prefix}")))
}

/// Apply all filtering rules, keeping only content entries the processor
/// should attempt to decode.
pub fn filter_entries(entries: Vec<RemoteContent>) -> Vec<RemoteContent> {
    entries
        .into_iter()
        .filter(|entry| {
            if entry.size > MAX_SIZE_BYTES {
                return false;
            }
            if entry.file_type != "file" {
                return false;
            }
            let lower = entry.path.to_lowercase();
            if looks_like_test_path(&lower) {
                return false;
            }
            if has_binary_extension(&lower) {
                return false;
            }
            if under_excluded_dir(&lower) {
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, size: u64, file_type: &str) -> RemoteContent {
        RemoteContent {
            path: path.to_string(),
            file_type: file_type.to_string(),
            content: String::new(),
            size,
            encoding: "utf-8".to_string(),
        }
    }

    #[test]
    fn drops_entries_over_512kb_keeps_entries_at_exactly_512kb() {
        let entries = vec![
            entry("a.rs", 512 * 1024, "file"),
            entry("b.rs", 512 * 1024 + 1, "file"),
        ];
        let kept = filter_entries(entries);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].path, "a.rs");
    }

    #[test]
    fn drops_non_file_entries() {
        let entries = vec![entry("src", 10, "dir")];
        assert!(filter_entries(entries).is_empty());
    }

    #[test]
    fn drops_test_paths() {
        let entries = vec![
            entry("src/lib_test.go", 10, "file"),
            entry("__tests__/foo.js", 10, "file"),
            entry("spec/widget_spec.rb", 10, "file"),
        ];
        assert!(filter_entries(entries).is_empty());
    }

    #[test]
    fn drops_binary_and_excluded_dirs() {
        let entries = vec![
            entry("logo.png", 10, "file"),
            entry("node_modules/pkg/index.js", 10, "file"),
            entry("vendor/lib/thing.go", 10, "file"),
        ];
        assert!(filter_entries(entries).is_empty());
    }

    #[test]
    fn keeps_normal_source_files() {
        let entries = vec![entry("src/main.rs", 100, "file")];
        assert_eq!(filter_entries(entries).len(), 1);
    }
}
