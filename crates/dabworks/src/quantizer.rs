//! Transform quantization.
//!
//! Stroke input arrives at high frequency with continuously varying
//! angle, scale and position. Snapping those values to a per-level grid
//! makes nearby requests collapse onto identical dab parameters.

use std::f64::consts::{PI, TAU};

use dabworks_config::MAX_PRECISION_LEVEL;
use tracing::warn;

use crate::constants::PRECISION_EPSILON;
use crate::error::DabError;
use crate::geometry::normalize_angle;

/// Snapping granularities of one precision level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionValues {
    /// Angle step in radians
    pub angle: f64,
    /// Relative scale step; 0 keeps scale exact
    pub size_fraction: f64,
    /// Sub-pixel step in pixels
    pub sub_pixel: f64,
    /// Softness step
    pub softness: f64,
}

const ONE_DEGREE: f64 = PI / 180.0;

/// Levels from coarsest (0) to full floating precision (4)
pub const PRECISION_LEVELS: [PrecisionValues; 5] = [
    PrecisionValues {
        angle: ONE_DEGREE,
        size_fraction: 0.05,
        sub_pixel: 1.0,
        softness: 0.01,
    },
    PrecisionValues {
        angle: ONE_DEGREE,
        size_fraction: 0.01,
        sub_pixel: 1.0,
        softness: 0.01,
    },
    PrecisionValues {
        angle: ONE_DEGREE,
        size_fraction: 0.0,
        sub_pixel: 1.0,
        softness: 0.01,
    },
    PrecisionValues {
        angle: ONE_DEGREE,
        size_fraction: 0.0,
        sub_pixel: 0.5,
        softness: 0.01,
    },
    PrecisionValues {
        angle: PRECISION_EPSILON,
        size_fraction: PRECISION_EPSILON,
        sub_pixel: PRECISION_EPSILON,
        softness: PRECISION_EPSILON,
    },
];

#[inline]
fn is_exact(granularity: f64) -> bool {
    granularity <= PRECISION_EPSILON
}

#[inline]
fn snap(value: f64, granularity: f64) -> f64 {
    if is_exact(granularity) || !value.is_finite() {
        value
    } else {
        (value / granularity).round() * granularity
    }
}

/// Snaps dab transform parameters for one precision level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformQuantizer {
    level: u8,
    values: PrecisionValues,
}

impl Default for TransformQuantizer {
    fn default() -> Self {
        Self::clamped(dabworks_config::DEFAULT_PRECISION_LEVEL)
    }
}

impl TransformQuantizer {
    pub fn new(level: u8) -> Result<Self, DabError> {
        if level > MAX_PRECISION_LEVEL {
            return Err(DabError::InvalidPrecisionLevel(level));
        }
        Ok(Self {
            level,
            values: PRECISION_LEVELS[level as usize],
        })
    }

    /// Like `new`, but out-of-range levels fall back to full precision
    pub fn clamped(level: u8) -> Self {
        if level > MAX_PRECISION_LEVEL {
            warn!(
                "TransformQuantizer: precision level {} out of range, using {}",
                level, MAX_PRECISION_LEVEL
            );
        }
        let level = level.min(MAX_PRECISION_LEVEL);
        Self {
            level,
            values: PRECISION_LEVELS[level as usize],
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn values(&self) -> PrecisionValues {
        self.values
    }

    /// Snap to the angle grid, result in [0, 2π)
    pub fn snap_angle(&self, angle: f64) -> f64 {
        let snapped = normalize_angle(snap(angle, self.values.angle));
        if TAU - snapped < 1e-9 { 0.0 } else { snapped }
    }

    /// Snap to the nearest power of (1 + size_fraction)
    pub fn snap_scale(&self, scale: f64) -> f64 {
        let g = self.values.size_fraction;
        if is_exact(g) || !scale.is_finite() || scale <= 0.0 {
            return scale;
        }
        let base = 1.0 + g;
        let exponent = (scale.ln() / base.ln()).round();
        base.powf(exponent)
    }

    /// Snap a split coordinate's fraction; a fraction rounding up to a
    /// whole pixel is carried into the integer part.
    pub fn snap_sub_pixel(&self, whole: i32, fraction: f64) -> (i32, f64) {
        let g = self.values.sub_pixel;
        if is_exact(g) || !fraction.is_finite() {
            return (whole, fraction);
        }
        let snapped = snap(fraction, g);
        if snapped >= 1.0 {
            (whole + 1, 0.0)
        } else {
            (whole, snapped.max(0.0))
        }
    }

    pub fn snap_softness(&self, softness: f64) -> f64 {
        snap(softness, self.values.softness)
    }
}
