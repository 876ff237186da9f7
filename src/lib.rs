//! # Image Squeeze
//!
//! Batch image optimizer: checks an intake batch against limits, then
//! re-encodes every accepted photo as a downscaled WebP or AVIF.
//!
//! ## Core Philosophy
//! - **Validation is data** - every rejected file is reported with a reason
//! - **One image at a time** - memory stays bounded by a single working set
//! - **All or nothing** - a batch either yields every result or names the file that failed
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - Validation, the optimization pipeline and the batch coordinator
//! - `events` - Channel-based progress reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ImageSqueezeError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
