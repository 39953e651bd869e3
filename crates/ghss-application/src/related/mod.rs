//! Relatedness engine (§4.F): multi-signal weighted scoring with a
//! coverage discount, streamed over paged candidates.

mod engine;
mod explain;
mod scoring;

pub use engine::RelatednessEngine;
