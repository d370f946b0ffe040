//! Shared configuration for dabworks
//!
//! This crate is the single source of truth for brush tip parameters and
//! the option settings that drive dab postprocessing and spacing. Callers
//! (stroke engines, settings front-ends, tests) deserialize these structs
//! and hand them to the `dabworks` core.

use serde::{Deserialize, Serialize};

/// Default spacing as a fraction of the dab size
pub const DEFAULT_SPACING: f64 = 0.1;

/// Smallest spacing a brush tip accepts
pub const MIN_SPACING: f64 = 0.02;

/// Default auto-spacing coefficient
pub const DEFAULT_AUTO_SPACING_COEFF: f64 = 1.0;

/// Default precision level (full floating precision)
pub const DEFAULT_PRECISION_LEVEL: u8 = 4;

/// Highest valid precision level
pub const MAX_PRECISION_LEVEL: u8 = 4;

/// Default sharpness threshold, in percent of full opacity.
/// 40 rather than 50 so that a 1x1 round tip still leaves a pixel.
pub const DEFAULT_SHARPNESS_THRESHOLD: u8 = 40;

/// Descriptor version written by current brushes
pub const CURRENT_BRUSH_VERSION: &str = "2";

/// Errors raised while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Brush tip descriptor.
///
/// Field names follow the descriptor attributes brush assets are stored
/// with (`type`, `filename`, `spacing`, `useAutoSpacing`,
/// `autoSpacingCoeff`, `angle`, `scale`, `BrushVersion`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrushTipSettings {
    /// Tip kind id: `mask`, `image`, `pipe_mask` or `pipe_image`
    #[serde(rename = "type")]
    pub kind: String,
    /// Short file name of the tip asset
    pub filename: String,
    /// Spacing as a fraction of the dab size
    pub spacing: f64,
    /// Whether auto-spacing replaces the fixed fraction
    pub use_auto_spacing: bool,
    /// Auto-spacing coefficient
    pub auto_spacing_coeff: f64,
    /// Base rotation in radians
    pub angle: f64,
    /// Base scale
    pub scale: f64,
    /// Descriptor version; "1" descriptors stored half-size scales
    #[serde(rename = "BrushVersion")]
    pub brush_version: String,
}

impl Default for BrushTipSettings {
    fn default() -> Self {
        Self {
            kind: "mask".to_string(),
            filename: String::new(),
            spacing: DEFAULT_SPACING,
            use_auto_spacing: false,
            auto_spacing_coeff: DEFAULT_AUTO_SPACING_COEFF,
            angle: 0.0,
            scale: 1.0,
            brush_version: CURRENT_BRUSH_VERSION.to_string(),
        }
    }
}

impl BrushTipSettings {
    /// Scale with the version 1 correction applied
    pub fn effective_scale(&self) -> f64 {
        if self.brush_version == "1" {
            self.scale * 2.0
        } else {
            self.scale
        }
    }

    /// Check that numeric fields are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.spacing.is_finite() {
            return Err(ConfigError::Invalid(format!("spacing {}", self.spacing)));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::Invalid(format!("scale {}", self.scale)));
        }
        if !self.angle.is_finite() {
            return Err(ConfigError::Invalid(format!("angle {}", self.angle)));
        }
        if !self.auto_spacing_coeff.is_finite() || self.auto_spacing_coeff <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "autoSpacingCoeff {}",
                self.auto_spacing_coeff
            )));
        }
        Ok(())
    }
}

/// Transform quantization level selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionSettings {
    /// 0 = coarsest, 4 = full precision
    pub level: u8,
}

impl Default for PrecisionSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_PRECISION_LEVEL,
        }
    }
}

/// Pressure-driven dab mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MirrorSettings {
    pub enabled: bool,
    pub horizontal: bool,
    pub vertical: bool,
    /// Use pen pressure as the sensor; otherwise the sensor reads 1.0
    pub use_pressure: bool,
}

/// Dab placement sharpening and alpha thresholding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharpnessSettings {
    pub enabled: bool,
    /// Percent of full opacity below which a pixel becomes transparent
    pub threshold: u8,
    /// Sharpness strength in 0..=1
    pub value: f64,
    /// Multiply the strength by pen pressure
    pub use_pressure: bool,
}

impl Default for SharpnessSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_SHARPNESS_THRESHOLD,
            value: 1.0,
            use_pressure: false,
        }
    }
}

/// How a texture pattern modulates dab opacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureMode {
    #[default]
    Multiply,
    Subtract,
}

/// Texture overlay applied after the dab is rasterized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureSettings {
    pub enabled: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub invert: bool,
    pub mode: TextureMode,
    /// Strength in 0..=1
    pub strength: f64,
    pub strength_from_pressure: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_x: 0,
            offset_y: 0,
            invert: false,
            mode: TextureMode::default(),
            strength: 1.0,
            strength_from_pressure: false,
        }
    }
}

/// Spacing behaviour along a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacingSettings {
    /// Scale spacing by pen pressure
    pub pressure_enabled: bool,
    /// Ignore stroke direction and use the larger dab dimension
    pub isotropic: bool,
}

/// Per-stroke paint operation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaintOpSettings {
    /// Dab scale relative to the tip's base scale
    pub scale: f64,
    /// Dab rotation in radians
    pub rotation: f64,
    /// Multiply scale by pen pressure
    pub size_pressure: bool,
    /// Compositing opacity 0.0-1.0
    pub opacity: f32,
    /// Softness handed to the tip
    pub softness: f64,
    /// Straight-alpha RGBA paint color
    pub color: [f32; 4],
    /// Level-of-detail scale of the target device (1.0 = full resolution)
    pub lod_scale: f64,
}

impl Default for PaintOpSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            size_pressure: false,
            opacity: 1.0,
            softness: 1.0,
            color: [0.0, 0.0, 0.0, 1.0],
            lod_scale: 1.0,
        }
    }
}

/// Everything the dab cache and stroke driver read from settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DabConfig {
    pub precision: PrecisionSettings,
    pub sub_pixel_precision: bool,
    pub mirror: MirrorSettings,
    pub sharpness: SharpnessSettings,
    pub texture: TextureSettings,
    pub spacing: SpacingSettings,
    pub paintop: PaintOpSettings,
}

impl Default for DabConfig {
    fn default() -> Self {
        Self {
            precision: PrecisionSettings::default(),
            sub_pixel_precision: true,
            mirror: MirrorSettings::default(),
            sharpness: SharpnessSettings::default(),
            texture: TextureSettings::default(),
            spacing: SpacingSettings::default(),
            paintop: PaintOpSettings::default(),
        }
    }
}

impl DabConfig {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision.level > MAX_PRECISION_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "precision level {} exceeds {}",
                self.precision.level, MAX_PRECISION_LEVEL
            )));
        }
        if self.sharpness.threshold > 100 {
            return Err(ConfigError::Invalid(format!(
                "sharpness threshold {}%",
                self.sharpness.threshold
            )));
        }
        if !self.paintop.lod_scale.is_finite() || self.paintop.lod_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "lod scale {}",
                self.paintop.lod_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DabConfig::default();
        assert_eq!(config.precision.level, DEFAULT_PRECISION_LEVEL);
        assert!(config.sub_pixel_precision);
        assert!(!config.mirror.enabled);
        assert_eq!(config.sharpness.threshold, DEFAULT_SHARPNESS_THRESHOLD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = DabConfig::from_json(r#"{ "precision": { "level": 1 } }"#).unwrap();
        assert_eq!(config.precision.level, 1);
        assert!(config.sub_pixel_precision);
        assert_eq!(config.paintop.scale, 1.0);
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let mut config = DabConfig::default();
        config.mirror.enabled = true;
        config.mirror.horizontal = true;
        config.texture.mode = TextureMode::Subtract;

        let json = config.to_json().unwrap();
        assert!(json.contains("\"subtract\""));
        assert_eq!(DabConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_precision_level() {
        let err = DabConfig::from_json(r#"{ "precision": { "level": 9 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = DabConfig::from_json("{ precision: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_brush_tip_descriptor_attribute_names() {
        let tip: BrushTipSettings = serde_json::from_str(
            r#"{
                "type": "image",
                "filename": "splat.png",
                "spacing": 0.3,
                "useAutoSpacing": true,
                "autoSpacingCoeff": 0.8,
                "angle": 0.5,
                "scale": 2.0,
                "BrushVersion": "2"
            }"#,
        )
        .unwrap();
        assert_eq!(tip.kind, "image");
        assert!(tip.use_auto_spacing);
        assert_eq!(tip.auto_spacing_coeff, 0.8);
        assert_eq!(tip.effective_scale(), 2.0);
    }

    #[test]
    fn test_version_one_descriptor_doubles_scale() {
        let tip = BrushTipSettings {
            scale: 0.5,
            brush_version: "1".to_string(),
            ..Default::default()
        };
        assert_eq!(tip.effective_scale(), 1.0);
    }

    #[test]
    fn test_tip_validation() {
        let mut tip = BrushTipSettings::default();
        assert!(tip.validate().is_ok());
        tip.scale = 0.0;
        assert!(tip.validate().is_err());
    }
}
