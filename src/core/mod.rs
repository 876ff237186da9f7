//! # Core Module
//!
//! The GUI-agnostic optimization engine.
//!
//! ## Modules
//! - `validation` - Decides which submitted files may be processed
//! - `optimizer` - Re-encodes one image as a smaller WebP or AVIF
//! - `coordinator` - Runs batches sequentially on a worker thread
//! - `intake` - Expands command-line paths into candidates
//! - `config` - Loads default limits and options
//! - `presets` - Predefined option sets
//! - `estimate` - Heuristic savings estimates

pub mod config;
pub mod coordinator;
pub mod estimate;
pub mod intake;
pub mod optimizer;
pub mod presets;
pub mod validation;

// Re-export commonly used types
pub use coordinator::{BatchHandle, Coordinator, SavingsSummary};
pub use optimizer::{OptimizeOptions, OptimizeResult, Optimizer, OutputFormat};
pub use validation::{validate, Candidate, Limits, ValidationOutcome};
