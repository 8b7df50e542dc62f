//! Batch processing of recordings and their segments

pub mod orchestrator;

pub use orchestrator::{analyze_segment, analyze_segments, run, BatchOutcome, PipelineResult};
