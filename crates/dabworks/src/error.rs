//! Error types for dab construction and configuration.
//!
//! Rasterization itself never fails; these only surface while building
//! tips, quantizers and paint ops.

use dabworks_config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum DabError {
    #[error("Invalid precision level: {0} (expected 0..=4)")]
    InvalidPrecisionLevel(u8),

    #[error("Unknown brush kind: {0}")]
    UnknownBrushKind(String),

    #[error("Brush tip image is empty")]
    EmptyBrushTip,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
