//! Dab production for one brush tip.
//!
//! `DabCache` turns a cursor position plus transform into a rasterized,
//! positioned dab: it decides mirroring, snaps the placement to whole
//! pixels plus a sub-pixel remainder, quantizes the transform, asks the
//! tip for a mask or color stamp and finally runs the postprocessing
//! options over the result. Each call returns a freshly allocated dab
//! owned by the caller; only the scratch color-source buffer persists
//! between calls.

use std::f64::consts::TAU;

use dabworks_config::DabConfig;
use glam::{DVec2, IVec2};
use image::GrayImage;
use tracing::{debug, trace, warn};

use crate::brush::{BrushTip, Coloring};
use crate::color_source::DabColor;
use crate::error::DabError;
use crate::geometry::{positive_fraction, round_half_up, split_coordinate};
use crate::options::{MirrorOption, SharpnessOption, TextureOption};
use crate::pixel::{FixedPaintDevice, PixelFormat};
use crate::quantizer::TransformQuantizer;
use crate::types::{DabPlacement, DabRect, MirrorProperties, PaintInformation};

#[derive(Debug, Clone)]
pub struct DabCache {
    brush: BrushTip,
    mirror_option: Option<MirrorOption>,
    sharpness_option: Option<SharpnessOption>,
    texture_option: Option<TextureOption>,
    quantizer: TransformQuantizer,
    sub_pixel_precision_disabled: bool,
    /// Scratch buffer for per-pixel color sources
    color_source_device: Option<FixedPaintDevice>,
}

impl DabCache {
    /// Cache with no postprocessing and full precision
    pub fn new(brush: BrushTip) -> Self {
        Self {
            brush,
            mirror_option: None,
            sharpness_option: None,
            texture_option: None,
            quantizer: TransformQuantizer::default(),
            sub_pixel_precision_disabled: false,
            color_source_device: None,
        }
    }

    /// Cache wired up from settings. The texture pattern is only used
    /// when texturing is enabled.
    pub fn from_config(
        brush: BrushTip,
        config: &DabConfig,
        texture_pattern: Option<GrayImage>,
    ) -> Result<Self, DabError> {
        config.validate()?;
        let mut cache = Self::new(brush);
        cache.quantizer = TransformQuantizer::new(config.precision.level)?;
        cache.sub_pixel_precision_disabled = !config.sub_pixel_precision;
        cache.mirror_option = Some(MirrorOption::new(config.mirror));
        cache.sharpness_option = Some(SharpnessOption::new(config.sharpness));

        if config.texture.enabled {
            match texture_pattern {
                Some(pattern) => {
                    cache.texture_option = Some(TextureOption::new(config.texture, pattern))
                }
                None => warn!("DabCache::from_config: texturing enabled without a pattern"),
            }
        }

        debug!(
            "DabCache::from_config: precision={} sub_pixel={} texture={}",
            config.precision.level,
            config.sub_pixel_precision,
            cache.texture_option.is_some()
        );
        Ok(cache)
    }

    pub fn brush(&self) -> &BrushTip {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushTip {
        &mut self.brush
    }

    pub fn set_mirror_postprocessing(&mut self, option: Option<MirrorOption>) {
        self.mirror_option = option;
    }

    pub fn set_sharpness_postprocessing(&mut self, option: Option<SharpnessOption>) {
        self.sharpness_option = option;
    }

    pub fn set_texture_postprocessing(&mut self, option: Option<TextureOption>) {
        self.texture_option = option;
    }

    pub fn set_precision_level(&mut self, level: u8) -> Result<(), DabError> {
        self.quantizer = TransformQuantizer::new(level)?;
        Ok(())
    }

    pub fn quantizer(&self) -> &TransformQuantizer {
        &self.quantizer
    }

    pub fn disable_sub_pixel_precision(&mut self) {
        self.sub_pixel_precision_disabled = true;
    }

    /// Format of the scratch color-source buffer, if one was allocated
    pub fn scratch_format(&self) -> Option<PixelFormat> {
        self.color_source_device.as_ref().map(FixedPaintDevice::format)
    }

    /// Snap a mirrored axis' fraction. A fraction snapping to a whole
    /// pixel wraps to 0 since the integer position is recomputed.
    fn snap_mirrored_fraction(&self, fraction: f64) -> f64 {
        match self.quantizer.snap_sub_pixel(0, fraction) {
            (0, snapped) => snapped,
            _ => 0.0,
        }
    }

    /// Where a dab lands for the given cursor and transform
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_placement(
        &self,
        cursor: DVec2,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        info: &PaintInformation,
        mirror: MirrorProperties,
        softness: f64,
    ) -> DabPlacement {
        let angle = if mirror.coordinate_system_flipped {
            TAU - angle
        } else {
            angle
        };
        let angle = self.quantizer.snap_angle(angle);
        let scale_x = self.quantizer.snap_scale(scale_x);
        let scale_y = self.quantizer.snap_scale(scale_y);
        let softness = self.quantizer.snap_softness(softness);

        let hot_spot = self.brush.hot_spot(scale_x, scale_y, angle);
        let pt = cursor - hot_spot;

        let ((mut x, mut y), fraction) = match &self.sharpness_option {
            Some(sharpness) => sharpness.apply(info, pt),
            None => {
                let (x, fx) = split_coordinate(pt.x);
                let (y, fy) = split_coordinate(pt.y);
                ((x, y), DVec2::new(fx, fy))
            }
        };
        let (mut sub_x, mut sub_y) = (fraction.x, fraction.y);

        if self.sub_pixel_precision_disabled {
            sub_x = 0.0;
            sub_y = 0.0;
        }
        if sub_x.is_nan() {
            sub_x = 0.0;
        }
        if sub_y.is_nan() {
            sub_y = 0.0;
        }

        (x, sub_x) = self.quantizer.snap_sub_pixel(x, sub_x);
        (y, sub_y) = self.quantizer.snap_sub_pixel(y, sub_y);

        let mut width = self.brush.mask_width(scale_x, scale_y, angle, sub_x, sub_y);
        let mut height = self.brush.mask_height(scale_x, scale_y, angle, sub_x, sub_y);

        if mirror.horizontal_mirror {
            sub_x = self.snap_mirrored_fraction(positive_fraction(-(cursor.x + hot_spot.x)));
            width = self.brush.mask_width(scale_x, scale_y, angle, sub_x, sub_y);
            x = round_half_up(cursor.x + sub_x + hot_spot.x) - width;
        }

        if mirror.vertical_mirror {
            sub_y = self.snap_mirrored_fraction(positive_fraction(-(cursor.y + hot_spot.y)));
            height = self.brush.mask_height(scale_x, scale_y, angle, sub_x, sub_y);
            y = round_half_up(cursor.y + sub_y + hot_spot.y) - height;
        }

        DabPlacement {
            rect: DabRect::new(x, y, width, height),
            sub_pixel: DVec2::new(sub_x, sub_y),
            real_angle: angle,
            scale_x,
            scale_y,
            softness,
            mirror,
        }
    }

    /// Rasterize one dab. Returns the dab and its canvas rectangle.
    #[allow(clippy::too_many_arguments)]
    pub fn fetch_dab(
        &mut self,
        format: PixelFormat,
        color: DabColor<'_>,
        cursor: DVec2,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        info: &PaintInformation,
        softness: f64,
    ) -> (FixedPaintDevice, DabRect) {
        let mirror = self
            .mirror_option
            .as_ref()
            .map(|option| option.apply(info))
            .unwrap_or_default();

        let placement =
            self.calculate_placement(cursor, scale_x, scale_y, angle, info, mirror, softness);
        let rect = placement.rect;
        let sub = placement.sub_pixel;

        let mut dab = if self.brush.kind().is_image() {
            let ratio = if placement.scale_x != 0.0 {
                placement.scale_y / placement.scale_x
            } else {
                1.0
            };
            self.brush.paint_device(
                format,
                placement.scale_x,
                ratio,
                placement.real_angle,
                sub.x,
                sub.y,
            )
        } else {
            let mut dab = FixedPaintDevice::new(format);
            match color {
                DabColor::Source(source) if !source.is_uniform_color() => {
                    if self
                        .color_source_device
                        .as_ref()
                        .is_none_or(|device| device.format() != format)
                    {
                        debug!("DabCache: allocating {:?} color source buffer", format);
                        self.color_source_device = Some(FixedPaintDevice::new(format));
                    }
                    let scratch = self
                        .color_source_device
                        .get_or_insert_with(|| FixedPaintDevice::new(format));
                    source.colorize(scratch, rect.at_origin(), IVec2::new(rect.x, rect.y));
                    self.brush.generate_mask(
                        &mut dab,
                        Some(Coloring::per_pixel(scratch)),
                        placement.scale_x,
                        placement.scale_y,
                        placement.real_angle,
                        sub.x,
                        sub.y,
                        placement.softness,
                    );
                }
                _ => {
                    let encoded = format.encode(color.uniform().unwrap_or_default());
                    self.brush.generate_mask(
                        &mut dab,
                        Some(Coloring::Uniform(&encoded)),
                        placement.scale_x,
                        placement.scale_y,
                        placement.real_angle,
                        sub.x,
                        sub.y,
                        placement.softness,
                    );
                }
            }
            dab
        };

        // empty tips rasterize to 1x1 even with a sub-pixel offset
        let rect = DabRect::new(rect.x, rect.y, dab.width() as i32, dab.height() as i32);
        dab.set_rect(rect);

        if !mirror.is_empty() {
            dab.mirror(mirror.horizontal_mirror, mirror.vertical_mirror);
        }

        self.post_process_dab(&mut dab, IVec2::new(rect.x, rect.y), info);

        trace!(
            "fetch_dab: rect=({}, {}) {}x{} sub=({:.3}, {:.3}) angle={:.4}",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            sub.x,
            sub.y,
            placement.real_angle
        );

        (dab, rect)
    }

    fn post_process_dab(&self, dab: &mut FixedPaintDevice, top_left: IVec2, info: &PaintInformation) {
        if let Some(sharpness) = &self.sharpness_option {
            sharpness.apply_threshold(dab);
        }
        if let Some(texture) = &self.texture_option {
            texture.apply(dab, top_left, info);
        }
    }
}
