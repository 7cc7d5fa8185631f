// Client for the multimodal vision service that reads grocery photos
pub mod client;
pub mod parse;
pub mod retry;

// Re-export common types
pub use client::{AnalysisError, VisionClient};
pub use parse::{NutritionFacts, ProductAnalysis};
pub use retry::RetryConfig;

/// Result type alias because typing Result<T, AnalysisError> everywhere is tedious
pub type Result<T> = std::result::Result<T, AnalysisError>;
