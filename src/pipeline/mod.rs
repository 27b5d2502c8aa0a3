//! Translation pipeline: dedup, batch, pace, reassemble, fan out

pub mod batcher;
pub mod orchestrator;
pub mod pacing;
pub mod reassembler;

pub use batcher::DeduplicatingBatcher;
pub use orchestrator::WorkbookTranslator;
pub use pacing::BatchPacer;
