//! Predefined option presets.

use crate::core::optimizer::{OptimizeOptions, OutputFormat};
use crate::error::ConfigError;
use serde::Serialize;

/// A named combination of width, format and quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub max_width: u32,
    pub format: OutputFormat,
    pub quality: u8,
}

impl Preset {
    /// Overlay this preset on `base`; fields the preset does not set are kept
    pub fn apply(&self, base: &OptimizeOptions) -> OptimizeOptions {
        OptimizeOptions {
            max_width: self.max_width,
            format: self.format,
            quality: self.quality,
            ..base.clone()
        }
    }
}

pub const PRESETS: [Preset; 5] = [
    Preset {
        id: "web-performance",
        name: "Web performance",
        description: "Small files for fast page loads",
        max_width: 1920,
        format: OutputFormat::Webp,
        quality: 75,
    },
    Preset {
        id: "high-quality",
        name: "High quality",
        description: "Large, detailed images with modest savings",
        max_width: 2560,
        format: OutputFormat::Webp,
        quality: 90,
    },
    Preset {
        id: "social-media",
        name: "Social media",
        description: "Sized for feeds and posts",
        max_width: 1080,
        format: OutputFormat::Webp,
        quality: 80,
    },
    Preset {
        id: "modern-format",
        name: "Modern format",
        description: "AVIF for the best compression on modern browsers",
        max_width: 1920,
        format: OutputFormat::Avif,
        quality: 65,
    },
    Preset {
        id: "balanced",
        name: "Balanced",
        description: "A sensible default between size and quality",
        max_width: 1920,
        format: OutputFormat::Webp,
        quality: 80,
    },
];

/// All predefined presets
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// Look up a preset by id
pub fn find_preset(id: &str) -> Result<&'static Preset, ConfigError> {
    PRESETS
        .iter()
        .find(|preset| preset.id == id)
        .ok_or_else(|| ConfigError::UnknownPreset { id: id.to_string() })
}
