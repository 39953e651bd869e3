//! `ghss stats` — aggregate store statistics (§4.A `GetStats`).

use std::collections::BTreeMap;

use anyhow::Result;

use ghss_domain::ports::Store;

use super::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    let stats = ctx.store.get_stats().await?;

    println!("repositories:   {}", stats.total_repositories);
    println!("content chunks: {}", stats.total_chunks);
    println!("on-disk size:   {:.2} MB", stats.on_disk_mb);
    match stats.last_sync {
        Some(last_sync) => println!("last sync:      {last_sync}"),
        None => println!("last sync:      never"),
    }

    println!("\ntop languages:");
    for (language, count) in top_n(&stats.language_histogram, 10) {
        println!("  {language:<20} {count}");
    }

    println!("\ntop topics:");
    for (topic, count) in top_n(&stats.topic_histogram, 10) {
        println!("  {topic:<20} {count}");
    }

    Ok(())
}

fn top_n(histogram: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = histogram.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}
