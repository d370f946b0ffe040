//! Fixed-size, tightly packed pixel buffer used for dabs and scratch
//! color sources.

use image::RgbaImage;

use super::PixelFormat;
use crate::types::DabRect;

/// A rectangle of pixels in a single format, stored row-major without
/// padding. Bounds carry the canvas placement; data is always indexed
/// from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPaintDevice {
    format: PixelFormat,
    bounds: DabRect,
    data: Vec<u8>,
}

impl FixedPaintDevice {
    /// Create an empty device in the given format
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            bounds: DabRect::default(),
            data: Vec::new(),
        }
    }

    /// Create a zeroed device covering `rect`
    pub fn with_rect(format: PixelFormat, rect: DabRect) -> Self {
        let mut device = Self::new(format);
        device.set_rect(rect);
        device.initialize();
        device
    }

    /// Convert an RGBA8 image into `format`
    pub fn from_rgba_image(format: PixelFormat, image: &RgbaImage) -> Self {
        let rect = DabRect::new(0, 0, image.width() as i32, image.height() as i32);
        let mut device = Self::with_rect(format, rect);
        let pixel_size = format.pixel_size();
        for (dst, src) in device
            .data
            .chunks_exact_mut(pixel_size)
            .zip(image.pixels())
        {
            format.write_rgba8(dst, src.0);
        }
        device
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.format.pixel_size()
    }

    #[inline]
    pub fn bounds(&self) -> DabRect {
        self.bounds
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.bounds.width.max(0) as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.bounds.height.max(0) as usize
    }

    /// Change the bounds; call `initialize` before touching pixels
    pub fn set_rect(&mut self, rect: DabRect) {
        self.bounds = rect;
    }

    /// Resize storage to the bounds and zero every byte
    pub fn initialize(&mut self) {
        let len = self.bounds.area() * self.pixel_size();
        self.data.clear();
        self.data.resize(len, 0);
    }

    /// Zero every byte, keeping the bounds
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes of one row
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width() * self.pixel_size()
    }

    /// Pixel at device-local coordinates
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let ps = self.pixel_size();
        let start = y * self.row_stride() + x * ps;
        self.data.get(start..start + ps)
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let ps = self.pixel_size();
        let start = y * self.row_stride() + x * ps;
        self.data.get_mut(start..start + ps)
    }

    /// Opacity at device-local coordinates, 0 outside
    pub fn opacity_at(&self, x: usize, y: usize) -> u8 {
        self.pixel(x, y)
            .map(|p| self.format.opacity_u8(p))
            .unwrap_or(0)
    }

    /// Fill every pixel with one encoded color
    pub fn fill(&mut self, pixel: &[u8]) {
        let ps = self.pixel_size();
        for dst in self.data.chunks_exact_mut(ps) {
            dst.copy_from_slice(&pixel[..ps]);
        }
    }

    /// Flip the content in place along the requested axes
    pub fn mirror(&mut self, horizontal: bool, vertical: bool) {
        let ps = self.pixel_size();
        let stride = self.row_stride();
        let (w, h) = (self.width(), self.height());
        if stride == 0 || h == 0 {
            return;
        }

        if horizontal {
            for row in self.data.chunks_exact_mut(stride) {
                for x in 0..w / 2 {
                    let (left, right) = row.split_at_mut((w - 1 - x) * ps);
                    left[x * ps..(x + 1) * ps].swap_with_slice(&mut right[..ps]);
                }
            }
        }

        if vertical {
            for y in 0..h / 2 {
                let (top, bottom) = self.data.split_at_mut((h - 1 - y) * stride);
                top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
            }
        }
    }
}
