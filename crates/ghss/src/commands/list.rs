//! `ghss list` — paginated listing of locally stored repositories (§6).

use anyhow::Result;

use ghss_domain::entities::Repository;
use ghss_domain::ports::Store;

use super::Context;
use crate::cli::OutputFormat;

pub async fn run(ctx: &Context, limit: usize, offset: usize, format: OutputFormat) -> Result<()> {
    let repos = ctx.store.list_repositories(limit, offset).await?;

    if repos.is_empty() {
        println!("No repositories stored yet. Run `ghss sync` to index your starred repositories.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&repos),
        OutputFormat::Json => print_json(&repos)?,
        OutputFormat::Csv => print_csv(&repos),
    }

    Ok(())
}

fn print_table(repos: &[Repository]) {
    println!("{:<40} {:>8} {:<15} DESCRIPTION", "REPOSITORY", "STARS", "LANGUAGE");
    for repo in repos {
        let description = repo.description.clone().unwrap_or_default();
        println!(
            "{:<40} {:>8} {:<15} {}",
            repo.full_name,
            repo.stars,
            repo.language.clone().unwrap_or_else(|| "-".to_string()),
            truncate(&description, 60),
        );
    }
}

fn print_json(repos: &[Repository]) -> Result<()> {
    let rows: Vec<serde_json::Value> = repos
        .iter()
        .map(|r| {
            serde_json::json!({
                "full_name": r.full_name,
                "stars": r.stars,
                "forks": r.forks,
                "language": r.language,
                "description": r.description,
                "topics": r.topics,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_csv(repos: &[Repository]) {
    println!("full_name,stars,forks,language,description");
    for repo in repos {
        println!(
            "{},{},{},{},{}",
            csv_field(&repo.full_name),
            repo.stars,
            repo.forks,
            csv_field(repo.language.as_deref().unwrap_or("")),
            csv_field(repo.description.as_deref().unwrap_or("")),
        );
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}
