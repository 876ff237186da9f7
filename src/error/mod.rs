//! # Error Module
//!
//! User-friendly error types for the image optimizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - file names, surface sizes, what went wrong
//! - **Validation is data** - rejections are reported, never raised
//! - **One terminal error per batch** - the first failing file is named

use crate::core::optimizer::{OutputFormat, SurfaceRole};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ImageSqueezeError {
    #[error("Optimization error: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No files could be accepted: {0}")]
    Rejected(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while optimizing a single image
#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("Could not acquire {role} surface ({width}x{height}): {reason}")]
    Surface {
        role: SurfaceRole,
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("{format} encoding failed: {reason}")]
    Encode { format: OutputFormat, reason: String },

    #[error("Invalid optimize options: {0}")]
    InvalidOptions(String),
}

/// Errors that terminate a processing batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The batch stopped at this file; nothing from the batch is returned.
    #[error("Failed to process {name}: {message}")]
    FileFailed {
        index: usize,
        name: String,
        message: String,
    },

    #[error("Batch was cancelled")]
    Cancelled,

    #[error("The processing worker is no longer running")]
    WorkerUnavailable,
}

/// Errors loading configuration or presets
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Unknown preset '{id}'. Run `img-squeeze presets` to list them.")]
    UnknownPreset { id: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ImageSqueezeError>;
