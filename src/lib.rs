// Library exports for reuse by other applications
pub mod cli;
pub mod config_file;
pub mod processing;
pub mod utils;

// Re-export commonly used types
pub use processing::error::ProcessError;
pub use processing::{
    BatchOutcome, Corner, OutputFormat, OutputSpec, Placement, ProcessedResult, ProcessingEngine,
    Watermark,
};
