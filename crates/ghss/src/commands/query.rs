//! `ghss query` — natural-language search over the local store (§4.E).

use anyhow::Result;

use ghss_application::{RelatednessEngine, SearchEngine, SearchMode, SearchOptions};

use super::Context;
use crate::cli::QueryMode;

pub async fn run(
    ctx: &Context,
    text: String,
    mode: QueryMode,
    limit: usize,
    long: bool,
    short: bool,
    related: bool,
) -> Result<()> {
    let engine = SearchEngine::new(ctx.store.clone(), ctx.embedder.clone());
    let opts = SearchOptions {
        mode: match mode {
            QueryMode::Fuzzy => SearchMode::Fuzzy,
            QueryMode::Vector => SearchMode::Vector,
        },
        limit,
        min_score: ctx.config.search.default_min_score,
        long,
    };

    let results = engine.search(&text, opts).await?;
    if results.is_empty() {
        println!("no matches for '{text}'");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!("{}. {} ({:.3})", i + 1, result.repository.full_name, result.score);
        if short {
            continue;
        }
        if let Some(description) = &result.repository.description {
            println!("   {description}");
        }
        if !result.matches.is_empty() {
            let fields: Vec<&str> = result.matches.iter().map(|m| m.field).collect();
            println!("   matched: {}", fields.join(", "));
        }
        if let Some((same_org, shared_contrib)) = result.related_counts {
            println!("   related: {same_org} same-org, {shared_contrib} shared-contributor");
        }
    }

    if related {
        if let Some(top) = results.first() {
            let related_engine = RelatednessEngine::new(ctx.store.clone());
            let candidates = related_engine.find_related(&top.repository.full_name, 3).await?;
            if !candidates.is_empty() {
                println!("\nrelated to {}:", top.repository.full_name);
                for candidate in candidates {
                    println!(
                        "  {} ({:.2}) - {}",
                        candidate.repository.full_name, candidate.scores.final_score, candidate.explanation
                    );
                }
            }
        }
    }

    Ok(())
}
