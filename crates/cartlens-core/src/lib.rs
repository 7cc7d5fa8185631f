// Core business logic lives here - the brain of the operation
pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod image;
pub mod lists;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod session;

pub use analyzer::ImageAnalyzer;
pub use config::Config;
pub use error::Error;
pub use lists::ListStore;
pub use pipeline::{Candidate, ItemPipeline, PipelineState};
pub use providers::VisionAnalyzer;
pub use session::{Session, SubmissionTicket};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
