//! `ghss info` — full detail dump for one stored repository (§6).

use anyhow::{bail, Result};

use ghss_domain::ports::Store;

use super::Context;

pub async fn run(ctx: &Context, full_name: &str) -> Result<()> {
    let Some((repo, chunks)) = ctx.store.get_repository(full_name).await? else {
        bail!("repository '{full_name}' not found in the local store");
    };

    println!("{}", repo.full_name);
    if let Some(description) = &repo.description {
        println!("  {description}");
    }
    if let Some(homepage) = &repo.homepage {
        println!("  homepage:  {homepage}");
    }
    println!("  language:  {}", repo.language.as_deref().unwrap_or("-"));
    println!("  stars:     {}  forks: {}  size: {} KB", repo.stars, repo.forks, repo.size_kb);
    println!(
        "  issues:    {}/{} open/total   prs: {}/{} open/total",
        repo.open_issues, repo.total_issues, repo.open_prs, repo.total_prs
    );
    println!(
        "  commits:   {} (30d)  {} (1y)  {} (total)",
        repo.commits_30d, repo.commits_1y, repo.commits_total
    );
    if !repo.topics.is_empty() {
        println!("  topics:    {}", repo.topics.join(", "));
    }
    if !repo.languages.is_empty() {
        let langs: Vec<String> = repo
            .languages
            .iter()
            .map(|(name, bytes)| format!("{name} ({bytes})"))
            .collect();
        println!("  languages: {}", langs.join(", "));
    }
    if let Some(license) = &repo.license_name {
        println!("  license:   {license}");
    }
    if !repo.contributors.is_empty() {
        let mut handles: Vec<String> = repo.top_contributor_handles().into_iter().collect();
        handles.sort();
        println!("  top contributors: {}", handles.join(", "));
    }
    if let Some(purpose) = &repo.purpose {
        println!("  purpose:   {purpose}");
    }
    println!(
        "  embedding: {}",
        if repo.embedding.is_some() { "present" } else { "absent" }
    );
    println!("  synced:    {}", repo.last_synced);
    println!(
        "  chunks:    {} ({} tokens)",
        chunks.len(),
        chunks.iter().map(|c| u64::from(c.tokens)).sum::<u64>()
    );

    Ok(())
}
