//! `ghss related` — find repositories related to a stored repository
//! (§4.F).

use anyhow::{bail, Result};

use ghss_application::RelatednessEngine;

use super::Context;

pub async fn run(ctx: &Context, full_name: &str, limit: usize) -> Result<()> {
    if limit == 0 || limit > 20 {
        bail!("--limit must be between 1 and 20");
    }
    let engine = RelatednessEngine::new(ctx.store.clone());
    let candidates = engine.find_related(full_name, limit).await?;

    if candidates.is_empty() {
        println!("no related repositories found for '{full_name}'");
        return Ok(());
    }

    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "{}. {} ({:.2}) - {}",
            i + 1,
            candidate.repository.full_name,
            candidate.scores.final_score,
            candidate.explanation
        );
    }

    Ok(())
}
