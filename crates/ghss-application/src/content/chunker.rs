//! Chunking (§4.C step 6): split decoded file content into
//! token-bounded [`ContentChunk`]s.

use regex::Regex;
use std::sync::LazyLock;

use ghss_domain::constants::MAX_TOKENS_PER_CHUNK;
use ghss_domain::entities::{ChunkType, ContentChunk};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+").unwrap());
static CODE_DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(func|function|def|class|interface|type|struct|impl|fn)\s+").unwrap()
});

const FIXED_GROUP_LINES: usize = 50;

/// `ceil(len(bytes) / 4)`, the token estimator used throughout the
/// content processor.
pub fn estimate_tokens(text: &str) -> u32 {
    ((text.len() + 3) / 4) as u32
}

/// A section of content prior to final per-line splitting, carrying its
/// own label suffix (e.g. `"1"`, `"2"`) to compose into
/// `source#section[.subsection]`.
struct Section {
    label: String,
    content: String,
}

/// Split `content` into top-level sections according to `chunk_type`'s
/// splitting strategy.
fn split_into_sections(content: &str, chunk_type: ChunkType) -> Vec<Section> {
    let splitter_re = if chunk_type.is_prose() {
        Some(&*HEADING_RE)
    } else if chunk_type == ChunkType::Code {
        Some(&*CODE_DEF_RE)
    } else {
        None
    };

    if let Some(re) = splitter_re {
        let sections = split_on_matching_lines(content, re);
        if sections.len() > 1 {
            return sections
                .into_iter()
                .enumerate()
                .map(|(i, body)| Section {
                    label: (i + 1).to_string(),
                    content: body,
                })
                .collect();
        }
    }

    // Fall back to blank-line paragraphs, and if that doesn't split the
    // content either, fixed-size line groups.
    let paragraphs = split_on_blank_lines(content);
    if paragraphs.len() > 1 {
        return paragraphs
            .into_iter()
            .enumerate()
            .map(|(i, body)| Section {
                label: (i + 1).to_string(),
                content: body,
            })
            .collect();
    }

    split_fixed_line_groups(content, FIXED_GROUP_LINES)
        .into_iter()
        .enumerate()
        .map(|(i, body)| Section {
            label: (i + 1).to_string(),
            content: body,
        })
        .collect()
}

/// Split `content` so that every line matching `re` starts a new section.
fn split_on_matching_lines(content: &str, re: &Regex) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();
    for line in content.lines() {
        if re.is_match(line) && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

/// Split `content` on blank-line paragraph boundaries.
fn split_on_blank_lines(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.to_string())
        .collect()
}

/// Split `content` into fixed-size groups of `group_size` lines.
fn split_fixed_line_groups(content: &str, group_size: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return vec![content.to_string()];
    }
    lines
        .chunks(group_size)
        .map(|group| group.join("\n"))
        .collect()
}

/// Further split a section that still exceeds the per-chunk token budget,
/// by lines, until every piece fits.
fn split_to_fit(content: &str, max_tokens: u32) -> Vec<String> {
    if estimate_tokens(content) <= max_tokens {
        return vec![content.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for line in content.lines() {
        let would_be = format!("{current}{line}\n");
        if !current.is_empty() && estimate_tokens(&would_be) > max_tokens {
            pieces.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    if pieces.is_empty() {
        pieces.push(content.to_string());
    }
    pieces
}

/// Chunk a single decoded file's content.
///
/// If the whole file fits under [`MAX_TOKENS_PER_CHUNK`] it is emitted as
/// one chunk labeled with its source path alone. Otherwise it is split
/// into sections per `chunk_type`'s strategy, and any section still over
/// budget is further split by line until every emitted chunk fits.
pub fn chunk_file(source_path: &str, content: &str, chunk_type: ChunkType, priority: u8) -> Vec<ContentChunk> {
    let whole_tokens = estimate_tokens(content);
    if whole_tokens <= MAX_TOKENS_PER_CHUNK as u32 {
        return vec![ContentChunk {
            source_path: source_path.to_string(),
            chunk_type,
            content: content.to_string(),
            tokens: whole_tokens,
            priority,
            label: source_path.to_string(),
        }];
    }

    let sections = split_into_sections(content, chunk_type);
    let mut chunks = Vec::new();
    for section in sections {
        let pieces = split_to_fit(&section.content, MAX_TOKENS_PER_CHUNK as u32);
        let multi = pieces.len() > 1;
        for (i, piece) in pieces.into_iter().enumerate() {
            let label = if multi {
                format!("{source_path}#{}.{}", section.label, i + 1)
            } else {
                format!("{source_path}#{}", section.label)
            };
            chunks.push(ContentChunk {
                source_path: source_path.to_string(),
                chunk_type,
                tokens: estimate_tokens(&piece),
                content: piece,
                priority,
                label,
            });
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_file_becomes_single_chunk() {
        let chunks = chunk_file("README.md", "hello world", ChunkType::Readme, 1);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].label, "README.md");
    }

    #[test]
    fn every_emitted_chunk_respects_the_token_budget() {
        let big_markdown = (0..2000)
            .map(|i| format!("# Heading {i}\nsome text here that takes space\n"))
            .collect::<String>();
        let chunks = chunk_file("doc.md", &big_markdown, ChunkType::Docs, 2);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.tokens <= MAX_TOKENS_PER_CHUNK as u32);
        }
    }

    #[test]
    fn code_splits_on_function_definitions() {
        let code = "fn a() {}\nfn b() {}\nfn c() {}\n".repeat(2000);
        let chunks = chunk_file("lib.rs", &code, ChunkType::Code, 3);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.tokens <= MAX_TOKENS_PER_CHUNK as u32);
        }
    }

    #[test]
    fn labels_use_source_hash_section_dot_subsection() {
        let big_markdown = (0..3000)
            .map(|i| format!("# H{i}\nbody body body body body body\n"))
            .collect::<String>();
        let chunks = chunk_file("doc.md", &big_markdown, ChunkType::Docs, 2);
        assert!(chunks[0].label.starts_with("doc.md#"));
    }
}
