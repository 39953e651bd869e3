//! Classification (§4.C step 4) and priority assignment (step 5).

use ghss_domain::entities::ChunkType;

use super::paths::PACKAGE_MANIFESTS;

const CONFIG_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "toml", "ini", "conf", "config"];

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "go", "py", "js", "jsx", "ts", "tsx", "java", "c", "h", "cpp", "cc", "cxx", "hpp", "cs",
    "rb", "php", "swift", "kt", "kts", "scala", "sh", "bash", "lua", "r", "pl", "ex", "exs",
    "erl", "hs", "ml", "clj", "zig", "dart", "vue", "svelte",
];

fn base_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_lowercase()
}

fn extension(path: &str) -> Option<String> {
    base_name(path).rsplit_once('.').map(|(_, ext)| ext.to_string())
}

/// Classify a path into a [`ChunkType`], per the first-match-wins table in
/// §4.C step 4.
pub fn classify(path: &str) -> ChunkType {
    let base = base_name(path);
    let lower_path = path.to_lowercase();

    if base.starts_with("readme") {
        return ChunkType::Readme;
    }
    if lower_path.contains("doc") || lower_path.contains("wiki") {
        return ChunkType::Docs;
    }
    if base.contains("changelog") || base.contains("changes") || base.contains("history") {
        return ChunkType::Changelog;
    }
    if base.contains("license") || base.contains("copying") {
        return ChunkType::License;
    }
    if PACKAGE_MANIFESTS
        .iter()
        .any(|m| m.to_lowercase() == base)
    {
        return ChunkType::Package;
    }
    if let Some(ext) = extension(path) {
        if CONFIG_EXTENSIONS.contains(&ext.as_str()) {
            return ChunkType::Config;
        }
        if CODE_EXTENSIONS.contains(&ext.as_str()) {
            return ChunkType::Code;
        }
    }
    ChunkType::Docs
}

/// Assign a priority (1 = high, 2 = medium, 3 = low) per §4.C step 5.
pub fn priority(path: &str, chunk_type: ChunkType) -> u8 {
    let base = base_name(path);
    let lower_path = path.to_lowercase();
    match chunk_type {
        ChunkType::Readme | ChunkType::Package | ChunkType::Changelog => 1,
        ChunkType::Docs => {
            if lower_path.contains("index") || lower_path.contains("getting") {
                1
            } else {
                2
            }
        }
        ChunkType::Code => {
            if base.contains("main") || base.contains("index") || base.contains("app") {
                2
            } else {
                3
            }
        }
        ChunkType::Config => 2,
        ChunkType::License => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readme_wins_over_doc_substring() {
        assert_eq!(classify("README.md"), ChunkType::Readme);
    }

    #[test]
    fn docs_directory_detected() {
        assert_eq!(classify("docs/guide.md"), ChunkType::Docs);
        assert_eq!(classify("wiki/Home.md"), ChunkType::Docs);
    }

    #[test]
    fn changelog_and_license_detected() {
        assert_eq!(classify("CHANGELOG.md"), ChunkType::Changelog);
        assert_eq!(classify("LICENSE"), ChunkType::License);
        assert_eq!(classify("COPYING"), ChunkType::License);
    }

    #[test]
    fn package_manifest_detected() {
        assert_eq!(classify("Cargo.toml"), ChunkType::Package);
    }

    #[test]
    fn config_and_code_extensions() {
        assert_eq!(classify("config.yaml"), ChunkType::Config);
        assert_eq!(classify("src/main.rs"), ChunkType::Code);
    }

    #[test]
    fn unknown_extension_falls_back_to_docs() {
        assert_eq!(classify("NOTES"), ChunkType::Docs);
    }

    #[test]
    fn priorities_follow_the_table() {
        assert_eq!(priority("README.md", ChunkType::Readme), 1);
        assert_eq!(priority("docs/index.md", ChunkType::Docs), 1);
        assert_eq!(priority("docs/other.md", ChunkType::Docs), 2);
        assert_eq!(priority("src/main.rs", ChunkType::Code), 2);
        assert_eq!(priority("src/util.rs", ChunkType::Code), 3);
        assert_eq!(priority("package.json", ChunkType::Config), 2);
        assert_eq!(priority("LICENSE", ChunkType::License), 3);
    }
}
