/// Smallest spacing fraction a tip accepts.
pub const MIN_SPACING: f64 = dabworks_config::MIN_SPACING;

/// Below this many pixels along either axis a dab is too small to render.
pub const MIN_RENDERABLE_EXTENT: f64 = 0.01;

/// Granularities at or below this value mean "full floating precision".
pub const PRECISION_EPSILON: f64 = 1e-6;

/// Source pixels with alpha below this contribute no coverage.
pub const TRANSPARENCY_THRESHOLD: u8 = 1;

/// Closest two dabs may be placed along a stroke, in pixels.
pub const MIN_DAB_DISTANCE: f64 = 0.5;

/// Fully opaque 8-bit opacity.
pub const OPACITY_OPAQUE_U8: u8 = 255;

/// Fully transparent 8-bit opacity.
pub const OPACITY_TRANSPARENT_U8: u8 = 0;

/// Spacing above which level-of-detail previews degrade visibly.
pub const HUGE_SPACING: f64 = 0.5;
