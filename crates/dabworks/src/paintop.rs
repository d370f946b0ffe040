//! Stroke driver for brush-tip based painting.
//!
//! `BrushBasedPaintOp` places dabs along stroke segments at the distance
//! the spacing policy asks for and composites each fetched dab onto a
//! `CpuSurface`.

use dabworks_config::{DabConfig, PaintOpSettings};
use glam::DVec2;
use image::GrayImage;
use tracing::{debug, trace};

use crate::brush::{BrushTip, LodLimitation};
use crate::color_source::DabColor;
use crate::constants::{MIN_DAB_DISTANCE, MIN_RENDERABLE_EXTENT};
use crate::dab_cache::DabCache;
use crate::error::DabError;
use crate::options::SpacingOption;
use crate::pixel::PixelFormat;
use crate::spacing::{SpacingInformation, SpacingPolicy};
use crate::surface::CpuSurface;
use crate::types::{DabRect, PaintInformation};

/// Segments shorter than this produce no dabs
const MIN_SEGMENT_LENGTH: f64 = 1e-3;

pub struct BrushBasedPaintOp {
    dab_cache: DabCache,
    spacing_policy: SpacingPolicy,
    spacing_option: SpacingOption,
    settings: PaintOpSettings,
    /// Format dabs are produced in
    format: PixelFormat,
    /// Last sample of the current stroke (None if stroke not started)
    last_info: Option<PaintInformation>,
    /// Distance travelled since the last dab
    distance_accumulator: f64,
}

impl BrushBasedPaintOp {
    pub fn new(
        brush: BrushTip,
        config: &DabConfig,
        format: PixelFormat,
        texture_pattern: Option<GrayImage>,
    ) -> Result<Self, DabError> {
        let dab_cache = DabCache::from_config(brush, config, texture_pattern)?;
        debug!(
            "BrushBasedPaintOp::new: tip '{}' {}x{} format={:?}",
            dab_cache.brush().name(),
            dab_cache.brush().width(),
            dab_cache.brush().height(),
            format
        );
        Ok(Self {
            dab_cache,
            spacing_policy: SpacingPolicy::new(config.paintop.lod_scale),
            spacing_option: SpacingOption::new(config.spacing),
            settings: config.paintop,
            format,
            last_info: None,
            distance_accumulator: 0.0,
        })
    }

    pub fn dab_cache(&self) -> &DabCache {
        &self.dab_cache
    }

    pub fn dab_cache_mut(&mut self) -> &mut DabCache {
        &mut self.dab_cache
    }

    pub fn brush(&self) -> &BrushTip {
        self.dab_cache.brush()
    }

    pub fn settings(&self) -> &PaintOpSettings {
        &self.settings
    }

    pub fn can_paint(&self) -> bool {
        !self.brush().is_empty()
    }

    /// True when a dab at `scale` would be under a hundredth of a pixel
    pub fn check_size_too_small(&self, scale: f64) -> bool {
        let brush = self.brush();
        let scale = scale * brush.scale();
        scale * (brush.width() as f64) < MIN_RENDERABLE_EXTENT
            || scale * (brush.height() as f64) < MIN_RENDERABLE_EXTENT
    }

    /// Spacing for a uniform scale, ignoring pressure
    pub fn effective_spacing(&self, scale: f64, rotation: f64) -> SpacingInformation {
        self.spacing_policy
            .effective_spacing_for_scale(self.brush(), scale, rotation)
    }

    /// Spacing for the dab painted at `info`
    pub fn spacing_for(&self, info: &PaintInformation) -> SpacingInformation {
        let scale = self.dab_scale(info);
        self.spacing_policy.effective_spacing_with_option(
            self.brush(),
            scale,
            scale,
            self.settings.rotation,
            &self.spacing_option,
            info,
        )
    }

    pub fn lod_limitations(&self) -> Vec<LodLimitation> {
        self.brush().lod_limitations()
    }

    fn dab_scale(&self, info: &PaintInformation) -> f64 {
        if self.settings.size_pressure {
            self.settings.scale * info.pressure.clamp(0.0, 1.0)
        } else {
            self.settings.scale
        }
    }

    /// Paint one dab centred on `info.pos`
    pub fn paint_at(&mut self, info: &PaintInformation, surface: &mut CpuSurface) -> Option<DabRect> {
        if !self.can_paint() {
            return None;
        }
        let scale = self.dab_scale(info);
        if self.check_size_too_small(scale) {
            trace!("paint_at: scale {:.5} too small, skipping dab", scale);
            return None;
        }

        let (dab, rect) = self.dab_cache.fetch_dab(
            self.format,
            DabColor::Plain(self.settings.color),
            info.pos,
            scale,
            scale,
            self.settings.rotation,
            info,
            self.settings.softness,
        );
        surface.composite_dab(&dab, rect, self.settings.opacity);
        Some(rect)
    }

    /// Paint dabs between two samples. The first sample is assumed to be
    /// painted already; leftover distance carries into the next segment.
    pub fn paint_line(
        &mut self,
        from: &PaintInformation,
        to: &PaintInformation,
        surface: &mut CpuSurface,
    ) -> Vec<DabRect> {
        let mut rects = Vec::new();
        let delta = to.pos - from.pos;
        let length = delta.length();
        if !length.is_finite() || length < MIN_SEGMENT_LENGTH {
            return rects;
        }
        let direction = delta / length;

        let mut travelled = 0.0;
        let mut current = *from;
        loop {
            let step = self
                .spacing_for(&current)
                .distance_along(direction)
                .max(MIN_DAB_DISTANCE);
            let needed = (step - self.distance_accumulator).max(0.0);

            if travelled + needed > length {
                self.distance_accumulator += length - travelled;
                break;
            }

            travelled += needed;
            self.distance_accumulator = 0.0;
            current = from.mix(to, travelled / length, from.pos + direction * travelled);
            if let Some(rect) = self.paint_at(&current, surface) {
                rects.push(rect);
            }
        }

        if !rects.is_empty() {
            debug!(
                "BrushBasedPaintOp::paint_line: {} dabs from ({:.1}, {:.1}) to ({:.1}, {:.1})",
                rects.len(),
                from.pos.x,
                from.pos.y,
                to.pos.x,
                to.pos.y
            );
        }
        rects
    }

    /// Start a new stroke
    pub fn begin_stroke(&mut self) {
        self.last_info = None;
        self.distance_accumulator = 0.0;
    }

    /// Feed the next stroke sample. The first sample of a stroke paints a
    /// dab in place; later ones paint along the segment from the previous.
    pub fn stroke_to(&mut self, info: PaintInformation, surface: &mut CpuSurface) -> Vec<DabRect> {
        let rects = match self.last_info {
            None => {
                self.distance_accumulator = 0.0;
                self.paint_at(&info, surface).into_iter().collect()
            }
            Some(last) => self.paint_line(&last, &info, surface),
        };
        self.last_info = Some(info);
        rects
    }

    /// End the current stroke
    pub fn end_stroke(&mut self) {
        self.last_info = None;
        self.distance_accumulator = 0.0;
    }

    /// Position of the last sample of the current stroke
    pub fn last_position(&self) -> Option<DVec2> {
        self.last_info.map(|info| info.pos)
    }
}
