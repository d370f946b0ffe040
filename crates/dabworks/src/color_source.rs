//! Sources of paint color for mask-type dabs

use glam::IVec2;
use image::RgbaImage;

use crate::pixel::FixedPaintDevice;
use crate::types::DabRect;

/// Something that can paint color into a scratch device laid out like a dab
pub trait ColorSource {
    /// True when every pixel gets the same color
    fn is_uniform_color(&self) -> bool;

    /// The color of a uniform source, straight-alpha RGBA
    fn uniform_color(&self) -> [f32; 4];

    /// Fill `dst` (resized to `rect`) with colors for a dab whose canvas
    /// position is `origin`
    fn colorize(&self, dst: &mut FixedPaintDevice, rect: DabRect, origin: IVec2);
}

/// One color everywhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlainColorSource {
    color: [f32; 4],
}

impl PlainColorSource {
    pub fn new(color: [f32; 4]) -> Self {
        Self { color }
    }
}

impl ColorSource for PlainColorSource {
    fn is_uniform_color(&self) -> bool {
        true
    }

    fn uniform_color(&self) -> [f32; 4] {
        self.color
    }

    fn colorize(&self, dst: &mut FixedPaintDevice, rect: DabRect, _origin: IVec2) {
        dst.set_rect(rect);
        dst.initialize();
        let pixel = dst.format().encode(self.color);
        dst.fill(&pixel);
    }
}

/// Colors sampled from an image tiled over the canvas
#[derive(Debug, Clone)]
pub struct PatternColorSource {
    pattern: RgbaImage,
}

impl PatternColorSource {
    pub fn new(pattern: RgbaImage) -> Self {
        Self { pattern }
    }
}

impl ColorSource for PatternColorSource {
    fn is_uniform_color(&self) -> bool {
        false
    }

    /// Top-left pattern pixel; only meaningful for one-pixel patterns
    fn uniform_color(&self) -> [f32; 4] {
        self.pattern
            .get_pixel_checked(0, 0)
            .map(|p| p.0.map(|c| c as f32 / 255.0))
            .unwrap_or([0.0; 4])
    }

    fn colorize(&self, dst: &mut FixedPaintDevice, rect: DabRect, origin: IVec2) {
        dst.set_rect(rect);
        dst.initialize();
        let (pw, ph) = self.pattern.dimensions();
        if pw == 0 || ph == 0 {
            return;
        }

        let format = dst.format();
        let width = dst.width();
        for (i, pixel) in dst.data_mut().chunks_exact_mut(format.pixel_size()).enumerate() {
            let x = (origin.x + rect.x + (i % width) as i32).rem_euclid(pw as i32);
            let y = (origin.y + rect.y + (i / width) as i32).rem_euclid(ph as i32);
            format.write_rgba8(pixel, self.pattern.get_pixel(x as u32, y as u32).0);
        }
    }
}

/// Color argument of a dab request
#[derive(Clone, Copy)]
pub enum DabColor<'a> {
    /// Per-pixel or uniform source
    Source(&'a dyn ColorSource),
    /// A single straight-alpha color
    Plain([f32; 4]),
}

impl DabColor<'_> {
    /// The single color to use, if the request needs no per-pixel colors
    pub fn uniform(&self) -> Option<[f32; 4]> {
        match self {
            DabColor::Plain(color) => Some(*color),
            DabColor::Source(source) if source.is_uniform_color() => Some(source.uniform_color()),
            DabColor::Source(_) => None,
        }
    }
}

impl std::fmt::Debug for DabColor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DabColor::Source(source) => f
                .debug_struct("Source")
                .field("uniform", &source.is_uniform_color())
                .finish(),
            DabColor::Plain(color) => f.debug_tuple("Plain").field(color).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelFormat;
    use image::Rgba;

    #[test]
    fn test_plain_source_fills() {
        let source = PlainColorSource::new([1.0, 0.0, 0.0, 1.0]);
        let mut dst = FixedPaintDevice::new(PixelFormat::Rgba8);
        source.colorize(&mut dst, DabRect::new(0, 0, 2, 2), IVec2::new(5, 5));
        assert!(dst.data().chunks(4).all(|p| p == [255, 0, 0, 255]));
        assert_eq!(DabColor::Source(&source).uniform(), Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_pattern_source_tiles_from_origin() {
        let pattern = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let source = PatternColorSource::new(pattern);
        let mut dst = FixedPaintDevice::new(PixelFormat::Rgba8);
        source.colorize(&mut dst, DabRect::new(0, 0, 3, 1), IVec2::new(1, 0));
        assert_eq!(dst.pixel(0, 0), Some(&[0u8, 0, 255, 255][..]));
        assert_eq!(dst.pixel(1, 0), Some(&[255u8, 0, 0, 255][..]));
        assert_eq!(dst.pixel(2, 0), Some(&[0u8, 0, 255, 255][..]));
        assert_eq!(DabColor::Source(&source).uniform(), None);
    }
}
