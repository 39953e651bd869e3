//! `ghss config` — print the resolved configuration (§6). Its JSON body
//! is only printed when `debug` is enabled.

use anyhow::Result;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    println!("database:  {}", config.store.database_path.display());
    println!("cache dir: {}", config.store.cache_dir.display());
    println!(
        "logging:   level={} json={}",
        config.logging.level, config.logging.json_format
    );
    println!(
        "search:    default_limit={} default_min_score={}",
        config.search.default_limit, config.search.default_min_score
    );
    println!(
        "embedding: provider={} model={} dimensions={}",
        config.embedding.provider, config.embedding.model, config.embedding.dimensions
    );
    println!(
        "sync:      batch_size={} request_timeout={}s metrics_stale_days={}",
        config.sync.batch_size, config.sync.request_timeout_secs, config.sync.metrics_stale_days
    );

    if config.debug {
        println!("\n{}", serde_json::to_string_pretty(config)?);
    }

    Ok(())
}
