//! `ghss` binary entry point.
//!
//! Parses the CLI, loads the layered configuration, wires up the concrete
//! adapters (DuckDB store, GitHub REST client, subprocess embedding
//! provider) behind an explicit [`commands::Context`], and dispatches to
//! one function per subcommand.

mod cli;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use cli::{Cli, Command};
use commands::Context;
use ghss_domain::ports::{CodeHostClient, EmbeddingProvider, Store};
use ghss_infrastructure::{init_logging, ConfigLoader, DuckDbStore};
use ghss_providers::{GitHubClient, SubprocessEmbeddingProvider};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = match loader.load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let store: Arc<dyn Store> = match DuckDbStore::open(Some(&config.store.database_path)) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = store.initialize().await {
        error!(%err, "failed to initialize store");
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    // GitHub personal access tokens are read directly from the process
    // environment and never persisted to the config file.
    let token = std::env::var("GITHUB_TOKEN").ok();
    let code_host: Arc<dyn CodeHostClient> = match GitHubClient::new(token) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let embedder: Arc<dyn EmbeddingProvider> = match SubprocessEmbeddingProvider::new(
        &config.store.cache_dir,
        config.embedding.provider.clone(),
        config.embedding.model.clone(),
        config.embedding.summary_model.clone(),
        config.embedding.dimensions,
        config.embedding.timeout_secs,
        config.embedding.first_use_timeout_secs,
    ) {
        Ok(provider) => Arc::new(provider),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = Context {
        store,
        code_host,
        embedder,
        config,
    };

    let result = match cli.command {
        Command::Sync {
            repo,
            verbose,
            batch_size,
            force,
        } => commands::sync(&ctx, repo, verbose, batch_size, force).await,
        Command::List {
            limit,
            offset,
            format,
        } => commands::list(&ctx, limit, offset, format).await,
        Command::Info { full_name } => commands::info(&ctx, &full_name).await,
        Command::Stats => commands::stats(&ctx).await,
        Command::Clear { force } => commands::clear(&ctx, force).await,
        Command::Query {
            text,
            mode,
            limit,
            long,
            short,
            related,
        } => commands::query(&ctx, text, mode, limit, long, short, related).await,
        Command::Related { full_name, limit } => commands::related(&ctx, &full_name, limit).await,
        Command::Config => commands::config(&ctx),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
