//! Brush tip: a source image plus the base transform and spacing it is
//! painted with.

use std::fmt;

use dabworks_config::BrushTipSettings;
use glam::DVec2;
use image::RgbaImage;
use tracing::{debug, trace, warn};

use super::coloring::Coloring;
use super::outline::{OUTLINE_THRESHOLD, Outline};
use super::transform::{image_size, transform_tip};
use crate::constants::{HUGE_SPACING, MIN_SPACING, OPACITY_OPAQUE_U8, TRANSPARENCY_THRESHOLD};
use crate::error::DabError;
use crate::geometry::{mul_u8, normalize_angle, rotated_bounds};
use crate::pixel::{FixedPaintDevice, PixelFormat};
use crate::types::DabRect;

/// What the tip image represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushKind {
    /// Grayscale coverage mask, colored by the paint color
    Mask,
    /// Full-color stamp
    Image,
    /// One mask out of an animated set
    PipeMask,
    /// One full-color stamp out of an animated set
    PipeImage,
}

impl BrushKind {
    /// Tips that carry their own color and bypass the paint color
    pub fn is_image(self) -> bool {
        matches!(self, BrushKind::Image | BrushKind::PipeImage)
    }

    /// Parse a descriptor `type` id
    pub fn from_id(id: &str) -> Result<Self, DabError> {
        match id {
            "mask" => Ok(BrushKind::Mask),
            "image" => Ok(BrushKind::Image),
            "pipe_mask" => Ok(BrushKind::PipeMask),
            "pipe_image" => Ok(BrushKind::PipeImage),
            other => Err(DabError::UnknownBrushKind(other.to_string())),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            BrushKind::Mask => "mask",
            BrushKind::Image => "image",
            BrushKind::PipeMask => "pipe_mask",
            BrushKind::PipeImage => "pipe_image",
        }
    }
}

impl fmt::Display for BrushKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Reasons a tip renders poorly on level-of-detail previews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodLimitation {
    /// Spacing so large that decimated previews drop visible dabs
    HugeSpacing,
}

impl LodLimitation {
    pub fn id(self) -> &'static str {
        match self {
            LodLimitation::HugeSpacing => "huge-spacing",
        }
    }
}

/// Luminance used for colored tips
#[inline]
fn gray(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 11 + g as u32 * 16 + b as u32 * 5) / 32) as u8
}

/// A brush tip
#[derive(Debug, Clone)]
pub struct BrushTip {
    /// Display name, usually the asset file name
    name: String,
    /// Decoded source image
    image: RgbaImage,
    width: u32,
    height: u32,
    /// Stored hot spot in tip pixels
    hot_spot: DVec2,
    /// Base rotation in radians
    angle: f64,
    /// Base scale
    scale: f64,
    /// Spacing as a fraction of the dab size
    spacing: f64,
    auto_spacing_active: bool,
    auto_spacing_coeff: f64,
    /// Coverage is taken from luminance instead of the red channel
    has_color: bool,
    kind: BrushKind,
    /// Lazily traced outline in the tip's native frame
    outline: Option<Outline>,
}

impl BrushTip {
    /// Wrap a decoded image. Empty images are accepted and rasterize to
    /// transparent dabs.
    pub fn new(image: RgbaImage, kind: BrushKind) -> Self {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            warn!("BrushTip::new: empty {} tip image", kind);
        }
        Self {
            name: String::new(),
            image,
            width,
            height,
            hot_spot: DVec2::new(width as f64 / 2.0, height as f64 / 2.0),
            angle: 0.0,
            scale: 1.0,
            spacing: dabworks_config::DEFAULT_SPACING,
            auto_spacing_active: false,
            auto_spacing_coeff: dabworks_config::DEFAULT_AUTO_SPACING_COEFF,
            has_color: kind.is_image(),
            kind,
            outline: None,
        }
    }

    /// Build a tip from a decoded image and its descriptor
    pub fn from_settings(image: RgbaImage, settings: &BrushTipSettings) -> Result<Self, DabError> {
        settings.validate()?;
        let kind = BrushKind::from_id(&settings.kind)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(DabError::EmptyBrushTip);
        }

        let mut tip = Self::new(image, kind);
        tip.name = settings.filename.clone();
        tip.set_spacing(settings.spacing);
        tip.set_auto_spacing(settings.use_auto_spacing, settings.auto_spacing_coeff);
        tip.set_angle(settings.angle);
        tip.set_scale(settings.effective_scale());

        debug!(
            "BrushTip::from_settings: {} '{}' {}x{} spacing={} scale={}",
            kind, tip.name, tip.width, tip.height, tip.spacing, tip.scale
        );
        Ok(tip)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Replace the source image; the hot spot moves to the new centre
    pub fn set_image(&mut self, image: RgbaImage) {
        let (width, height) = image.dimensions();
        self.image = image;
        self.width = width;
        self.height = height;
        self.hot_spot = DVec2::new(width as f64 / 2.0, height as f64 / 2.0);
        self.outline = None;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn kind(&self) -> BrushKind {
        self.kind
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.outline = None;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.outline = None;
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Set spacing, clamped to the minimum the tip accepts
    pub fn set_spacing(&mut self, spacing: f64) {
        self.spacing = if spacing.is_finite() {
            spacing.max(MIN_SPACING)
        } else {
            MIN_SPACING
        };
    }

    pub fn auto_spacing_active(&self) -> bool {
        self.auto_spacing_active
    }

    pub fn auto_spacing_coeff(&self) -> f64 {
        self.auto_spacing_coeff
    }

    pub fn set_auto_spacing(&mut self, active: bool, coeff: f64) {
        self.auto_spacing_active = active;
        self.auto_spacing_coeff = coeff;
    }

    pub fn has_color(&self) -> bool {
        self.has_color
    }

    pub fn set_has_color(&mut self, has_color: bool) {
        self.has_color = has_color;
        self.outline = None;
    }

    /// Stored hot spot in tip pixels
    pub fn hot_spot_point(&self) -> DVec2 {
        self.hot_spot
    }

    /// Store a hot spot, clamped into the tip
    pub fn set_hot_spot(&mut self, point: DVec2) {
        let max_x = (self.width as f64 - 1.0).max(0.0);
        let max_y = (self.height as f64 - 1.0).max(0.0);
        let clamp = |v: f64, max: f64| if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };
        self.hot_spot = DVec2::new(clamp(point.x, max_x), clamp(point.y, max_y));
    }

    /// Bounding size of the tip after base and requested transforms.
    /// Only `scale_x` is measured; the hot spot of a non-uniformly scaled
    /// dab is therefore centred for the x scale on both axes.
    pub fn characteristic_size(&self, scale_x: f64, _scale_y: f64, rotation: f64) -> (f64, f64) {
        let angle = self.mask_angle(rotation);
        rotated_bounds(
            self.width as f64,
            self.height as f64,
            scale_x * self.scale,
            angle,
        )
    }

    /// Angle the tip is rasterized with for a requested rotation
    pub fn mask_angle(&self, angle: f64) -> f64 {
        normalize_angle(angle + self.angle)
    }

    fn mask_size(
        &self,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
    ) -> (i32, i32) {
        image_size(
            self.width,
            self.height,
            scale_x * self.scale,
            scale_y * self.scale,
            self.mask_angle(angle),
            sub_pixel_x,
            sub_pixel_y,
        )
    }

    /// Raster width of a dab, one pixel wider with a horizontal sub-pixel offset
    pub fn mask_width(
        &self,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
    ) -> i32 {
        self.mask_size(scale_x, scale_y, angle, sub_pixel_x, sub_pixel_y).0
    }

    /// Raster height of a dab, one pixel taller with a vertical sub-pixel offset
    pub fn mask_height(
        &self,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
    ) -> i32 {
        self.mask_size(scale_x, scale_y, angle, sub_pixel_x, sub_pixel_y).1
    }

    /// Offset from the dab origin to the point placed under the cursor
    pub fn hot_spot(&self, scale_x: f64, scale_y: f64, rotation: f64) -> DVec2 {
        let (w, h) = self.characteristic_size(scale_x, scale_y, rotation);
        DVec2::new(0.5 * w.max(1.0), 0.5 * h.max(1.0))
    }

    #[inline]
    fn coverage(&self, [r, g, b, a]: [u8; 4]) -> u8 {
        if a < TRANSPARENCY_THRESHOLD {
            return 0;
        }
        let intensity = if self.has_color { gray(r, g, b) } else { r };
        mul_u8(OPACITY_OPAQUE_U8 - intensity, a)
    }

    /// Rasterize the tip into `dst`, which is resized to the dab at the
    /// origin. With a coloring the color is copied in and masked by the
    /// coverage; without one the coverage becomes the pixel opacity.
    /// Softness does not affect image tips.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_mask(
        &self,
        dst: &mut FixedPaintDevice,
        coloring: Option<Coloring<'_>>,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
        _softness: f64,
    ) {
        if self.is_empty() {
            trace!("generate_mask: empty tip, emitting transparent pixel");
            dst.set_rect(DabRect::new(0, 0, 1, 1));
            dst.initialize();
            return;
        }

        let transformed = transform_tip(
            &self.image,
            scale_x * self.scale,
            scale_y * self.scale,
            self.mask_angle(angle),
            sub_pixel_x,
            sub_pixel_y,
        );
        let (w, h) = transformed.dimensions();
        dst.set_rect(DabRect::new(0, 0, w as i32, h as i32));
        dst.initialize();

        let coverage: Vec<u8> = transformed.pixels().map(|p| self.coverage(p.0)).collect();
        let format = dst.format();
        let pixel_size = format.pixel_size();

        match coloring {
            Some(mut coloring) => {
                let stride = dst.row_stride();
                for (row, mask_row) in dst
                    .data_mut()
                    .chunks_exact_mut(stride)
                    .zip(coverage.chunks_exact(w as usize))
                {
                    for pixel in row.chunks_exact_mut(pixel_size) {
                        let color = coloring.current_color();
                        if color.len() >= pixel_size {
                            pixel.copy_from_slice(&color[..pixel_size]);
                        }
                        coloring.advance_column();
                    }
                    coloring.advance_row();
                    format.apply_alpha_u8_mask(row, mask_row);
                }
            }
            None => {
                for (pixel, &c) in dst.data_mut().chunks_exact_mut(pixel_size).zip(&coverage) {
                    format.set_opacity_u8(pixel, c);
                }
            }
        }
    }

    /// Coverage only
    #[allow(clippy::too_many_arguments)]
    pub fn mask(
        &self,
        dst: &mut FixedPaintDevice,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
        softness: f64,
    ) {
        self.generate_mask(
            dst,
            None,
            scale_x,
            scale_y,
            angle,
            sub_pixel_x,
            sub_pixel_y,
            softness,
        );
    }

    /// Coverage applied to one straight-alpha color
    #[allow(clippy::too_many_arguments)]
    pub fn mask_with_color(
        &self,
        dst: &mut FixedPaintDevice,
        color: [f32; 4],
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
        softness: f64,
    ) {
        let encoded = dst.format().encode(color);
        self.generate_mask(
            dst,
            Some(Coloring::Uniform(&encoded)),
            scale_x,
            scale_y,
            angle,
            sub_pixel_x,
            sub_pixel_y,
            softness,
        );
    }

    /// Coverage applied to per-pixel colors from `src`
    #[allow(clippy::too_many_arguments)]
    pub fn mask_with_device(
        &self,
        dst: &mut FixedPaintDevice,
        src: &FixedPaintDevice,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
        softness: f64,
    ) {
        self.generate_mask(
            dst,
            Some(Coloring::per_pixel(src)),
            scale_x,
            scale_y,
            angle,
            sub_pixel_x,
            sub_pixel_y,
            softness,
        );
    }

    /// Full-color dab for image tips
    pub fn paint_device(
        &self,
        format: PixelFormat,
        scale: f64,
        ratio: f64,
        angle: f64,
        sub_pixel_x: f64,
        sub_pixel_y: f64,
    ) -> FixedPaintDevice {
        if self.is_empty() {
            return FixedPaintDevice::with_rect(format, DabRect::new(0, 0, 1, 1));
        }
        let transformed = transform_tip(
            &self.image,
            scale * self.scale,
            scale * ratio * self.scale,
            self.mask_angle(angle),
            sub_pixel_x,
            sub_pixel_y,
        );
        FixedPaintDevice::from_rgba_image(format, &transformed)
    }

    /// Quick check for tips with a bright hole in the middle
    pub fn is_pierced_approx(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let w = self.width as f64;
        let h = self.height as f64;
        let x_portion = 0.1f64.min(5.0 / w);
        let y_portion = 0.1f64.min(5.0 / h);

        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let x0 = (((0.5 - x_portion) * w).floor() as i64).clamp(0, max_x);
        let x1 = (((0.5 + x_portion) * w).ceil() as i64).clamp(0, max_x);
        let y0 = (((0.5 - y_portion) * h).floor() as i64).clamp(0, max_y);
        let y1 = (((0.5 + y_portion) * h).ceil() as i64).clamp(0, max_y);

        let max_samples = (x1 - x0 + 1) * (y1 - y0 + 1);
        let failed_threshold = (0.1 * max_samples as f64) as i64;
        let threshold_value = (0.95 * 255.0) as u8;

        let mut failed = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.image.get_pixel(x as u32, y as u32).0[0] > threshold_value {
                    failed += 1;
                }
            }
        }
        failed > failed_threshold
    }

    /// Outline of the tip in its own frame, traced on first use
    pub fn outline(&mut self) -> &Outline {
        if self.outline.is_none() {
            let outline = self.trace_outline();
            self.outline = Some(outline);
        }
        self.outline.get_or_insert_with(Outline::default)
    }

    fn trace_outline(&self) -> Outline {
        let inverse_scale = if self.scale != 0.0 { 1.0 / self.scale } else { 1.0 };
        // image tips are bounded by their alpha, not by mask coverage
        let device = if self.kind.is_image() {
            self.paint_device(PixelFormat::Rgba8, inverse_scale, 1.0, -self.angle, 0.0, 0.0)
        } else {
            let mut device = FixedPaintDevice::new(PixelFormat::Alpha8);
            self.mask(
                &mut device,
                inverse_scale,
                inverse_scale,
                -self.angle,
                0.0,
                0.0,
                1.0,
            );
            device
        };
        trace!(
            "trace_outline: {}x{} mask",
            device.width(),
            device.height()
        );
        Outline::from_device(&device, OUTLINE_THRESHOLD)
    }

    /// Limitations for level-of-detail painting
    pub fn lod_limitations(&self) -> Vec<LodLimitation> {
        let mut limitations = Vec::new();
        if self.spacing > HUGE_SPACING {
            limitations.push(LodLimitation::HugeSpacing);
        }
        limitations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::f64::consts::{PI, TAU};

    fn disc_tip(size: u32) -> BrushTip {
        let r = size as f64 / 2.0;
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let dx = x as f64 + 0.5 - r;
            let dy = y as f64 + 0.5 - r;
            let a = if dx * dx + dy * dy <= r * r { 255 } else { 0 };
            Rgba([0, 0, 0, a])
        });
        BrushTip::new(image, BrushKind::Mask)
    }

    #[test]
    fn test_kind_ids() {
        assert_eq!(BrushKind::from_id("pipe_image").unwrap(), BrushKind::PipeImage);
        assert!(BrushKind::Image.is_image());
        assert!(!BrushKind::PipeMask.is_image());
        assert!(matches!(
            BrushKind::from_id("vector"),
            Err(DabError::UnknownBrushKind(_))
        ));
    }

    #[test]
    fn test_spacing_is_clamped() {
        let mut tip = disc_tip(8);
        tip.set_spacing(0.001);
        assert_eq!(tip.spacing(), MIN_SPACING);
        tip.set_spacing(0.3);
        assert_eq!(tip.spacing(), 0.3);
    }

    #[test]
    fn test_hot_spot_clamping() {
        let mut tip = disc_tip(64);
        tip.set_hot_spot(DVec2::new(-5.0, 1000.0));
        assert_eq!(tip.hot_spot_point(), DVec2::new(0.0, 63.0));
    }

    #[test]
    fn test_hot_spot_is_half_characteristic_size() {
        let tip = disc_tip(64);
        assert_eq!(tip.hot_spot(1.0, 1.0, 0.0), DVec2::new(32.0, 32.0));
        // tiny dabs still put the hot spot half a pixel in
        assert_eq!(tip.hot_spot(0.001, 0.001, 0.0), DVec2::new(0.5, 0.5));
    }

    #[test]
    fn test_characteristic_size_measures_x_scale_only() {
        let tip = disc_tip(10);
        assert_eq!(tip.characteristic_size(2.0, 0.5, 0.0), (20.0, 20.0));
        assert_eq!(tip.hot_spot(2.0, 0.5, 0.0), DVec2::new(10.0, 10.0));
        // the raster itself still follows the y scale
        assert_eq!(tip.mask_height(2.0, 0.5, 0.0, 0.0, 0.0), 5);
    }

    #[test]
    fn test_characteristic_size_is_periodic() {
        let mut tip = disc_tip(16);
        tip.set_image(RgbaImage::from_pixel(30, 10, Rgba([0, 0, 0, 255])));
        for rotation in [0.0, 0.3, 1.0, 2.5] {
            let (w0, h0) = tip.characteristic_size(1.5, 1.5, rotation);
            let (w1, h1) = tip.characteristic_size(1.5, 1.5, rotation + TAU);
            assert!((w0 - w1).abs() < 1e-9);
            assert!((h0 - h1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mask_size_never_zero() {
        let tip = disc_tip(100);
        // scale * extent == 0.01
        assert!(tip.mask_width(0.0001, 0.0001, 0.0, 0.0, 0.0) >= 1);
        assert!(tip.mask_height(0.0001, 0.0001, 0.0, 0.0, 0.0) >= 1);
        assert_eq!(tip.mask_width(1.0, 1.0, 0.0, 0.25, 0.0), 101);
        assert_eq!(tip.mask_height(1.0, 1.0, 0.0, 0.25, 0.0), 100);
    }

    #[test]
    fn test_base_scale_and_angle_apply() {
        let mut tip = disc_tip(10);
        tip.set_image(RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255])));
        tip.set_scale(2.0);
        assert_eq!(tip.mask_width(1.0, 1.0, 0.0, 0.0, 0.0), 40);
        tip.set_angle(PI / 2.0);
        assert_eq!(tip.mask_width(1.0, 1.0, 0.0, 0.0, 0.0), 20);
        assert_eq!(tip.mask_height(1.0, 1.0, 0.0, 0.0, 0.0), 40);
    }

    #[test]
    fn test_identity_mask_reproduces_coverage() {
        let image = RgbaImage::from_fn(6, 5, |x, y| Rgba([0, 0, 0, (x * 40 + y * 5) as u8]));
        let tip = BrushTip::new(image.clone(), BrushKind::Mask);
        let mut dst = FixedPaintDevice::new(PixelFormat::Alpha8);
        tip.mask(&mut dst, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(dst.bounds(), DabRect::new(0, 0, 6, 5));
        for (value, src) in dst.data().iter().zip(image.pixels()) {
            assert!((*value as i32 - src.0[3] as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_white_pixels_give_no_coverage() {
        let image = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let tip = BrushTip::new(image, BrushKind::Mask);
        assert_eq!(tip.coverage([255, 255, 255, 255]), 0);
        assert_eq!(tip.coverage([0, 0, 0, 255]), 255);
        assert_eq!(tip.coverage([0, 0, 0, 0]), 0);
    }

    #[test]
    fn test_colored_coverage_uses_luminance() {
        let mut tip = disc_tip(4);
        tip.set_has_color(true);
        // pure red: gray = 255 * 11 / 32
        assert_eq!(tip.coverage([255, 0, 0, 255]), 255 - 87);
        tip.set_has_color(false);
        assert_eq!(tip.coverage([255, 0, 0, 255]), 0);
    }

    #[test]
    fn test_uniform_color_is_masked() {
        let tip = disc_tip(8);
        let mut dst = FixedPaintDevice::new(PixelFormat::Rgba8);
        tip.mask_with_color(&mut dst, [1.0, 0.0, 0.0, 1.0], 1.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(dst.pixel(4, 4), Some(&[255u8, 0, 0, 255][..]));
        assert_eq!(dst.opacity_at(0, 0), 0);
    }

    #[test]
    fn test_per_pixel_color_is_masked() {
        let tip = BrushTip::new(
            RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])),
            BrushKind::Mask,
        );
        let mut src = FixedPaintDevice::with_rect(PixelFormat::Rgba8, DabRect::new(0, 0, 2, 2));
        src.fill(&[0, 0, 255, 255]);
        src.pixel_mut(1, 1)
            .unwrap()
            .copy_from_slice(&[0, 255, 0, 255]);

        let mut dst = FixedPaintDevice::new(PixelFormat::Rgba8);
        tip.mask_with_device(&mut dst, &src, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(dst.pixel(0, 0), Some(&[0u8, 0, 255, 255][..]));
        assert_eq!(dst.pixel(1, 1), Some(&[0u8, 255, 0, 255][..]));
    }

    #[test]
    fn test_empty_tip_gives_transparent_dab() {
        let tip = BrushTip::new(RgbaImage::new(0, 0), BrushKind::Mask);
        let mut dst = FixedPaintDevice::new(PixelFormat::Rgba8);
        tip.mask_with_color(&mut dst, [1.0, 1.0, 1.0, 1.0], 1.0, 1.0, 0.0, 0.5, 0.5, 1.0);
        assert_eq!(dst.bounds(), DabRect::new(0, 0, 1, 1));
        assert!(dst.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_paint_device_keeps_color() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 255]));
        let tip = BrushTip::new(image, BrushKind::Image);
        let dab = tip.paint_device(PixelFormat::Rgba8, 1.0, 1.0, 0.0, 0.0, 0.0);
        assert_eq!(dab.bounds(), DabRect::new(0, 0, 4, 4));
        let center = dab.pixel(2, 2).unwrap();
        assert!((center[1] as i32 - 200).abs() <= 1);
        assert_eq!(center[3], 255);
    }

    #[test]
    fn test_pierced_detection() {
        let solid = BrushTip::new(
            RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255])),
            BrushKind::Mask,
        );
        assert!(!solid.is_pierced_approx());

        let ring = RgbaImage::from_fn(40, 40, |x, y| {
            let d = ((x as f64 - 20.0).powi(2) + (y as f64 - 20.0).powi(2)).sqrt();
            if d < 10.0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        assert!(BrushTip::new(ring, BrushKind::Mask).is_pierced_approx());

        // one-pixel tips must not index past the edge
        let dot = BrushTip::new(
            RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])),
            BrushKind::Mask,
        );
        assert!(dot.is_pierced_approx());
    }

    #[test]
    fn test_outline_is_cached_and_invalidated() {
        let mut tip = BrushTip::new(
            RgbaImage::from_pixel(6, 4, Rgba([0, 0, 0, 255])),
            BrushKind::Mask,
        );
        tip.set_scale(2.0);
        let (min, max) = tip.outline().bounding_rect().unwrap();
        // traced in the tip's own frame regardless of base scale
        assert_eq!(min, DVec2::ZERO);
        assert_eq!(max, DVec2::new(6.0, 4.0));
        assert!(tip.outline.is_some());

        tip.set_angle(0.5);
        assert!(tip.outline.is_none());

        tip.outline();
        tip.set_has_color(false);
        assert!(tip.outline.is_none());
    }

    #[test]
    fn test_bright_image_tip_outline_follows_alpha() {
        let mut image = RgbaImage::from_pixel(6, 4, Rgba([255, 255, 255, 255]));
        image.put_pixel(0, 0, Rgba([255, 255, 255, 0]));
        let mut tip = BrushTip::new(image, BrushKind::Image);
        assert!(!tip.outline().is_empty());
        let (min, max) = tip.outline().bounding_rect().unwrap();
        assert_eq!(min, DVec2::ZERO);
        assert_eq!(max, DVec2::new(6.0, 4.0));
        // the transparent corner is cut out of the boundary
        let corner = DVec2::new(1.0, 0.0);
        assert!(
            tip.outline()
                .segments()
                .iter()
                .any(|s| s[0] == corner || s[1] == corner)
        );
    }

    #[test]
    fn test_lod_limitations() {
        let mut tip = disc_tip(8);
        tip.set_spacing(0.25);
        assert!(tip.lod_limitations().is_empty());
        tip.set_spacing(0.75);
        assert_eq!(tip.lod_limitations(), vec![LodLimitation::HugeSpacing]);
        assert_eq!(LodLimitation::HugeSpacing.id(), "huge-spacing");
    }

    #[test]
    fn test_from_settings() {
        let settings = BrushTipSettings {
            kind: "mask".to_string(),
            filename: "round.png".to_string(),
            spacing: 0.25,
            scale: 1.5,
            brush_version: "1".to_string(),
            ..Default::default()
        };
        let tip = BrushTip::from_settings(disc_tip(8).image().clone(), &settings).unwrap();
        assert_eq!(tip.name(), "round.png");
        assert_eq!(tip.spacing(), 0.25);
        assert_eq!(tip.scale(), 3.0);

        let err = BrushTip::from_settings(RgbaImage::new(0, 0), &settings).unwrap_err();
        assert!(matches!(err, DabError::EmptyBrushTip));
    }
}
