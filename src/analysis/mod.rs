// Batch analysis: fetch, analyze and stream results per symbol
pub mod orchestrator;

pub use orchestrator::{
    analyze_batch, collect_batch, AnalysisStream, BatchOptions, BatchRequest, DEFAULT_PACING,
    DEFAULT_WINDOW_SIZE, MAX_BATCH_SYMBOLS,
};
