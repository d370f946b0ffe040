//! Distance between consecutive dabs along a stroke

use glam::DVec2;

use crate::brush::BrushTip;
use crate::options::SpacingOption;
use crate::types::PaintInformation;

/// Spacing of the next dab. `spacing` holds the step along the dab's own
/// x and y axes; `rotation` orients those axes on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingInformation {
    pub spacing: DVec2,
    pub rotation: f64,
}

impl SpacingInformation {
    pub fn new(spacing: DVec2, rotation: f64) -> Self {
        Self { spacing, rotation }
    }

    pub fn is_isotropic(&self) -> bool {
        (self.spacing.x - self.spacing.y).abs() <= f64::EPSILON * self.spacing.x.abs().max(1.0)
    }

    /// Distance to the next dab when moving along the unit vector
    /// `direction`: the radius of the spacing ellipse in that direction
    pub fn distance_along(&self, direction: DVec2) -> f64 {
        if self.is_isotropic() {
            return self.spacing.x.max(0.0);
        }
        let (sx, sy) = (self.spacing.x.abs(), self.spacing.y.abs());
        if sx <= f64::EPSILON || sy <= f64::EPSILON {
            return sx.min(sy);
        }
        let local = DVec2::from_angle(-self.rotation).rotate(direction);
        let inv = (local.x / sx).powi(2) + (local.y / sy).powi(2);
        if inv <= 0.0 || !inv.is_finite() {
            return sx.min(sy);
        }
        1.0 / inv.sqrt()
    }
}

/// Auto-spacing curve: linear below one pixel, square root above
#[inline]
pub fn calc_auto_spacing(value: f64, coeff: f64) -> f64 {
    coeff * if value < 1.0 { value } else { value.sqrt() }
}

/// Spacing rules for a tip painted on a device at some level of detail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingPolicy {
    /// 1.0 at full resolution, 0.5 on a half-size preview, ...
    pub lod_scale: f64,
}

impl Default for SpacingPolicy {
    fn default() -> Self {
        Self { lod_scale: 1.0 }
    }
}

impl SpacingPolicy {
    pub fn new(lod_scale: f64) -> Self {
        Self { lod_scale }
    }

    /// Auto-spacing evaluated at full resolution and mapped back
    fn auto_spacing_at_lod(&self, size: DVec2, coeff: f64) -> DVec2 {
        let lod = if self.lod_scale > 0.0 { self.lod_scale } else { 1.0 };
        let lod0 = size / lod;
        lod * DVec2::new(
            calc_auto_spacing(lod0.x, coeff),
            calc_auto_spacing(lod0.y, coeff),
        )
    }

    pub fn effective_spacing(
        &self,
        tip: &BrushTip,
        dab_width: f64,
        dab_height: f64,
        extra_scale: f64,
        isotropic: bool,
        rotation: f64,
    ) -> SpacingInformation {
        let (spacing, rotation) = if !isotropic {
            let spacing = if tip.auto_spacing_active() {
                self.auto_spacing_at_lod(
                    DVec2::new(dab_width, dab_height),
                    tip.auto_spacing_coeff(),
                )
            } else {
                DVec2::new(dab_width, dab_height) * tip.spacing()
            };
            (spacing, rotation)
        } else {
            let dimension = dab_width.max(dab_height);
            let dimension = if tip.auto_spacing_active() {
                calc_auto_spacing(dimension, tip.auto_spacing_coeff())
            } else {
                dimension * tip.spacing()
            };
            (DVec2::splat(dimension), 0.0)
        };

        SpacingInformation::new(spacing * extra_scale, rotation)
    }

    /// Spacing for a uniformly scaled tip. Dab rotation is carried
    /// separately and not measured into the size.
    pub fn effective_spacing_for_scale(
        &self,
        tip: &BrushTip,
        scale: f64,
        rotation: f64,
    ) -> SpacingInformation {
        let (w, h) = tip.characteristic_size(scale, scale, 0.0);
        self.effective_spacing(tip, w, h, 1.0, false, rotation)
    }

    pub fn effective_spacing_with_option(
        &self,
        tip: &BrushTip,
        scale_x: f64,
        scale_y: f64,
        rotation: f64,
        option: &SpacingOption,
        info: &PaintInformation,
    ) -> SpacingInformation {
        let extra_scale = option.apply(info);
        let (w, h) = tip.characteristic_size(scale_x, scale_y, 0.0);
        self.effective_spacing(tip, w, h, extra_scale, option.is_isotropic(), rotation)
    }
}
