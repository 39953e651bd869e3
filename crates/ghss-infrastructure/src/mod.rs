//! # Infrastructure layer
//!
//! Cross-cutting technical concerns that back the application layer's
//! ports: the DuckDB-backed [`store`] implementation, layered
//! [`config`] loading, and structured [`logging`] setup.
//!
//! ## Module categories
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`store`] | DuckDB-backed `Store` implementation, schema migrations |
//! | [`config`] | Figment-layered `AppConfig` loading |
//! | [`logging`] | `tracing` subscriber setup, JSON/text, daily rotation |

pub mod config;
pub mod logging;
pub mod store;

pub use config::{AppConfig, ConfigLoader};
pub use logging::init_logging;
pub use store::DuckDbStore;
