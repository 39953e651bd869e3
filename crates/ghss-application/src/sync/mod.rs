//! Sync pipeline (§4.D): diff remote vs. local, then drive a worker pool
//! that fetches, chunks, embeds and stores each changed repository.

mod pipeline;
mod plan;

pub use pipeline::{PipelineDeps, SyncPipeline};
pub use plan::build_plan;
