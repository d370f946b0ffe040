//! Grayscale pattern overlay applied to finished dabs

use dabworks_config::{TextureMode, TextureSettings};
use glam::IVec2;
use image::GrayImage;
use tracing::{trace, warn};

use super::sensor_value;
use crate::geometry::mul_u8;
use crate::pixel::FixedPaintDevice;
use crate::types::PaintInformation;

#[derive(Debug, Clone)]
pub struct TextureOption {
    settings: TextureSettings,
    pattern: GrayImage,
}

impl TextureOption {
    pub fn new(settings: TextureSettings, pattern: GrayImage) -> Self {
        if settings.enabled && (pattern.width() == 0 || pattern.height() == 0) {
            warn!("TextureOption: empty pattern, texturing disabled");
        }
        Self { settings, pattern }
    }

    pub fn settings(&self) -> &TextureSettings {
        &self.settings
    }

    pub fn pattern(&self) -> &GrayImage {
        &self.pattern
    }

    fn is_active(&self) -> bool {
        self.settings.enabled && self.pattern.width() > 0 && self.pattern.height() > 0
    }

    /// Pattern value under a canvas pixel, tiled in both directions
    fn pattern_at(&self, canvas: IVec2) -> u8 {
        let px = (canvas.x + self.settings.offset_x).rem_euclid(self.pattern.width() as i32);
        let py = (canvas.y + self.settings.offset_y).rem_euclid(self.pattern.height() as i32);
        let value = self.pattern.get_pixel(px as u32, py as u32).0[0];
        if self.settings.invert { 255 - value } else { value }
    }

    /// Modulate the dab's opacity with the pattern. `top_left` is the dab's
    /// canvas position so neighbouring dabs sample a continuous texture.
    pub fn apply(&self, dab: &mut FixedPaintDevice, top_left: IVec2, info: &PaintInformation) {
        if !self.is_active() {
            return;
        }

        let strength = self.settings.strength.clamp(0.0, 1.0)
            * sensor_value(self.settings.strength_from_pressure, info);
        trace!(
            "TextureOption::apply: {:?} at {:?} strength={:.3}",
            self.settings.mode, top_left, strength
        );

        let format = dab.format();
        let width = dab.width();
        let strength_u8 = (strength * 255.0).round() as u8;
        let floor = ((1.0 - strength) * 255.0).round() as i32;

        for (i, pixel) in dab.data_mut().chunks_exact_mut(format.pixel_size()).enumerate() {
            let local = IVec2::new((i % width) as i32, (i / width) as i32);
            let pattern = self.pattern_at(top_left + local);
            match self.settings.mode {
                TextureMode::Multiply => {
                    format.multiply_alpha(pixel, mul_u8(pattern, strength_u8));
                }
                TextureMode::Subtract => {
                    let alpha = format.opacity_u8(pixel) as i32;
                    let reduced = (alpha - (pattern as i32 + floor)).clamp(0, 255);
                    format.set_opacity_u8(pixel, reduced as u8);
                }
            }
        }
    }
}
