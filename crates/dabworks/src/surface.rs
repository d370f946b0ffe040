//! CPU canvas that finished dabs are composited onto

use crate::pixel::FixedPaintDevice;
use crate::types::DabRect;

/// Float RGBA canvas with straight alpha, row-major
pub struct CpuSurface {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 4]>,
}

impl CpuSurface {
    /// Transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Pixel at the given coordinates, None outside the surface
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Source-over blend of `color` scaled by `opacity`
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], opacity: f32) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let dst = self.pixels[index];

        let src_alpha = color[3] * opacity;
        let inv_src_alpha = 1.0 - src_alpha;

        self.pixels[index] = [
            color[0] * src_alpha + dst[0] * inv_src_alpha,
            color[1] * src_alpha + dst[1] * inv_src_alpha,
            color[2] * src_alpha + dst[2] * inv_src_alpha,
            src_alpha + dst[3] * inv_src_alpha,
        ];
    }

    /// Blend a dab placed at `rect`, clipped to the surface
    pub fn composite_dab(&mut self, dab: &FixedPaintDevice, rect: DabRect, opacity: f32) {
        let format = dab.format();
        let width = dab.width().min(rect.width.max(0) as usize);
        let height = dab.height().min(rect.height.max(0) as usize);

        for dy in 0..height {
            let y = rect.y + dy as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for dx in 0..width {
                let x = rect.x + dx as i32;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let Some(pixel) = dab.pixel(dx, dy) else {
                    continue;
                };
                let color = format.decode(pixel);
                if color[3] > 0.0 {
                    self.blend_pixel(x as u32, y as u32, color, opacity);
                }
            }
        }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Summed alpha of every pixel, a cheap measure of painted coverage
    pub fn total_alpha(&self) -> f64 {
        self.pixels.iter().map(|p| p[3] as f64).sum()
    }
}
