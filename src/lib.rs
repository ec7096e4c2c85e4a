// Core modules
pub mod analysis;
pub mod api;
pub mod error;
pub mod indicators;
pub mod models;
pub mod report;
pub mod settings;
pub mod strategy;

// Re-export commonly used types
pub use analysis::{analyze_batch, AnalysisStream, BatchOptions, BatchRequest};
pub use api::{BinanceClient, MarketDataProvider};
pub use error::{BatchError, FetchError, InsufficientData};
pub use models::*;
pub use strategy::{Strategy, TrendStrategy};

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
