//! Pixel-snapping of dab placement and hard-edged alpha thresholding

use dabworks_config::SharpnessSettings;
use glam::DVec2;

use super::sensor_value;
use crate::constants::{OPACITY_OPAQUE_U8, OPACITY_TRANSPARENT_U8};
use crate::geometry::{round_half_up, split_coordinate};
use crate::pixel::FixedPaintDevice;
use crate::types::PaintInformation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpnessOption {
    settings: SharpnessSettings,
}

impl Default for SharpnessOption {
    fn default() -> Self {
        Self::new(SharpnessSettings::default())
    }
}

impl SharpnessOption {
    pub fn new(settings: SharpnessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SharpnessSettings {
        &self.settings
    }

    /// Threshold as an 8-bit opacity
    pub fn threshold_u8(&self) -> u8 {
        let percent = self.settings.threshold.min(100) as u32;
        ((percent * 255 + 50) / 100) as u8
    }

    /// Split a dab origin into integer pixels and fractions, pulled
    /// towards whole pixels by the sharpness strength
    pub fn apply(&self, info: &PaintInformation, point: DVec2) -> ((i32, i32), DVec2) {
        if !self.settings.enabled || self.settings.value == 0.0 {
            let (x, fx) = split_coordinate(point.x);
            let (y, fy) = split_coordinate(point.y);
            return ((x, y), DVec2::new(fx, fy));
        }

        let sharpness = self.settings.value.clamp(0.0, 1.0)
            * sensor_value(self.settings.use_pressure, info);

        if sharpness == 1.0 {
            return (
                (round_half_up(point.x), round_half_up(point.y)),
                DVec2::ZERO,
            );
        }

        let rounded = DVec2::new(
            round_half_up(point.x) as f64,
            round_half_up(point.y) as f64,
        );
        let pulled = point.lerp(rounded, sharpness);
        let (x, fx) = split_coordinate(pulled.x);
        let (y, fy) = split_coordinate(pulled.y);
        ((x, y), DVec2::new(fx, fy))
    }

    /// Make every pixel fully opaque or fully transparent
    pub fn apply_threshold(&self, dab: &mut FixedPaintDevice) {
        if !self.settings.enabled {
            return;
        }
        let threshold = self.threshold_u8();
        let format = dab.format();
        let pixel_size = format.pixel_size();
        for pixel in dab.data_mut().chunks_exact_mut(pixel_size) {
            let opacity = if format.opacity_u8(pixel) < threshold {
                OPACITY_TRANSPARENT_U8
            } else {
                OPACITY_OPAQUE_U8
            };
            format.set_opacity_u8(pixel, opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelFormat;
    use crate::types::DabRect;

    fn sharp(value: f64) -> SharpnessOption {
        SharpnessOption::new(SharpnessSettings {
            enabled: true,
            value,
            ..Default::default()
        })
    }

    #[test]
    fn test_disabled_splits_plainly() {
        let ((x, y), frac) =
            SharpnessOption::default().apply(&PaintInformation::default(), DVec2::new(3.25, -0.5));
        assert_eq!((x, y), (3, -1));
        assert!((frac.x - 0.25).abs() < 1e-12);
        assert!((frac.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_full_sharpness_rounds() {
        let ((x, y), frac) = sharp(1.0).apply(&PaintInformation::default(), DVec2::new(3.6, 2.5));
        assert_eq!((x, y), (4, 3));
        assert_eq!(frac, DVec2::ZERO);
    }

    #[test]
    fn test_partial_sharpness_pulls_towards_pixel() {
        let ((x, _), frac) = sharp(0.5).apply(&PaintInformation::default(), DVec2::new(3.2, 0.0));
        assert_eq!(x, 3);
        assert!((frac.x - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_scales_sharpness() {
        let option = SharpnessOption::new(SharpnessSettings {
            enabled: true,
            value: 1.0,
            use_pressure: true,
            ..Default::default()
        });
        let ((x, _), frac) = option.apply(&PaintInformation::at(0.0, 0.0, 0.5), DVec2::new(3.2, 0.0));
        assert_eq!(x, 3);
        assert!((frac.x - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_threshold() {
        let option = sharp(1.0);
        assert_eq!(option.threshold_u8(), 102);

        let mut dab = FixedPaintDevice::with_rect(PixelFormat::Alpha8, DabRect::new(0, 0, 4, 1));
        dab.data_mut().copy_from_slice(&[0, 101, 102, 200]);
        option.apply_threshold(&mut dab);
        assert_eq!(dab.data(), &[0, 0, 255, 255]);
    }

    #[test]
    fn test_threshold_disabled_is_noop() {
        let mut dab = FixedPaintDevice::with_rect(PixelFormat::Alpha8, DabRect::new(0, 0, 2, 1));
        dab.data_mut().copy_from_slice(&[10, 200]);
        SharpnessOption::default().apply_threshold(&mut dab);
        assert_eq!(dab.data(), &[10, 200]);
    }
}
