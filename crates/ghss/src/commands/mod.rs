//! One module per subcommand, each a thin adapter between parsed `clap`
//! arguments and the application-layer engines.

mod clear;
mod config;
mod info;
mod list;
mod query;
mod related;
mod stats;
mod sync;

pub use clear::run as clear;
pub use config::run as config;
pub use info::run as info;
pub use list::run as list;
pub use query::run as query;
pub use related::run as related;
pub use stats::run as stats;
pub use sync::run as sync;

use std::sync::Arc;

use ghss_domain::ports::{CodeHostClient, EmbeddingProvider, Store};
use ghss_infrastructure::AppConfig;

/// Collaborators every command needs, built once in `main()`.
pub struct Context {
    pub store: Arc<dyn Store>,
    pub code_host: Arc<dyn CodeHostClient>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub config: AppConfig,
}
