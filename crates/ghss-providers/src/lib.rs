//! Concrete adapters for the domain layer's remote ports (§6): a GitHub
//! REST [`CodeHostClient`](ghss_domain::ports::CodeHostClient) and a
//! subprocess-backed [`EmbeddingProvider`](ghss_domain::ports::EmbeddingProvider).

mod embedding;
mod github;

pub use embedding::SubprocessEmbeddingProvider;
pub use github::GitHubClient;
