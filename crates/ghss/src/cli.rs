//! Command-line surface (§6): one `clap` subcommand per operation, wired
//! to the application/infrastructure layers by an explicit builder in
//! `main()` — a single-binary CLI tool has no plugin surface to register
//! auto-discovered commands into.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ghss")]
#[command(about = "Index your starred GitHub repositories for natural-language search and relatedness discovery")]
#[command(version)]
pub struct Cli {
    /// Path to a config file, overriding the default XDG location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the starred set and sync it into the local store (§4.D).
    Sync {
        /// Sync a single repository instead of the full starred set.
        #[arg(long)]
        repo: Option<String>,
        /// Emit per-repository progress as it happens.
        #[arg(long)]
        verbose: bool,
        /// Repositories processed per worker-pool batch.
        #[arg(long, default_value_t = 10)]
        batch_size: usize,
        /// Re-process every repository even without a detected change.
        #[arg(long)]
        force: bool,
    },
    /// List locally stored repositories, paginated.
    List {
        /// Maximum rows to return.
        #[arg(long, default_value_t = 50)]
        limit: usize,
        /// Rows to skip before the first returned row.
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the full stored record for one repository.
    Info {
        /// `owner/name`.
        full_name: String,
    },
    /// Show aggregate store statistics.
    Stats,
    /// Remove every stored repository.
    Clear {
        /// Skip the typed `yes` confirmation prompt.
        #[arg(long)]
        force: bool,
    },
    /// Search stored repositories by text or embedding similarity (§4.E).
    Query {
        /// Query text.
        text: String,
        /// Search mode.
        #[arg(long, value_enum, default_value_t = QueryMode::Fuzzy)]
        mode: QueryMode,
        /// Maximum results, in `[1, 50]`.
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(usize).range(1..=50))]
        limit: usize,
        /// Long-form output: annotate each hit with related-repo counts.
        #[arg(long, conflicts_with = "short")]
        long: bool,
        /// Short-form output: one line per hit.
        #[arg(long, conflicts_with = "long")]
        short: bool,
        /// Also show up to 3 related repositories for the top hit.
        #[arg(long)]
        related: bool,
    },
    /// Find repositories related to a stored repository (§4.F).
    Related {
        /// `owner/name`.
        full_name: String,
        /// Maximum results, in `[1, 20]`.
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(usize).range(1..=20))]
        limit: usize,
    },
    /// Print the resolved configuration.
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryMode {
    Fuzzy,
    Vector,
}
