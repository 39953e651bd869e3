//! The documented list of priority paths the sync pipeline asks the code
//! host for (§4.C step 1). Selection is external to the processor itself —
//! this module only documents and generates the allow-list; filtering of
//! whatever comes back happens in [`super::filter`].

/// README variants, in the order callers should request them.
pub const README_VARIANTS: &[&str] = &[
    "README.md",
    "Readme.md",
    "readme.md",
    "README",
    "README.rst",
    "README.txt",
];

/// Package manifest filenames recognized across ecosystems.
pub const PACKAGE_MANIFESTS: &[&str] = &[
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "setup.py",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Gemfile",
    "composer.json",
];

/// Changelog filenames.
pub const CHANGELOG_NAMES: &[&str] = &["CHANGELOG.md", "CHANGES.md", "HISTORY.md"];

/// License filenames.
pub const LICENSE_NAMES: &[&str] = &["LICENSE", "LICENSE.md", "LICENSE.txt", "COPYING"];

/// Single top-level entry-point source files, one per ecosystem.
pub const ENTRY_POINTS: &[&str] = &[
    "main.go", "main.py", "main.rs", "index.js", "index.ts", "app.py", "app.js", "lib.rs",
];

/// The full documented priority-path allow-list: README variants, package
/// manifests, changelogs, licenses, and entry-point source files. Nested
/// test and example directories are never part of this list — the caller
/// only ever requests these fixed top-level names.
pub fn priority_paths() -> Vec<String> {
    README_VARIANTS
        .iter()
        .chain(PACKAGE_MANIFESTS.iter())
        .chain(CHANGELOG_NAMES.iter())
        .chain(LICENSE_NAMES.iter())
        .chain(ENTRY_POINTS.iter())
        .map(|s| (*s).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_paths_never_contains_nested_paths() {
        for path in priority_paths() {
            assert!(!path.contains('/'), "priority path {path} is nested");
        }
    }
}
