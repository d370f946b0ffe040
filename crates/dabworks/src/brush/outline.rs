//! Boundary outline of a rasterized tip, used for cursor previews.

use glam::DVec2;

use crate::pixel::FixedPaintDevice;

/// Opacity at or above which a pixel counts as inside the outline
pub const OUTLINE_THRESHOLD: u8 = 128;

/// Pixel-edge boundary between covered and uncovered pixels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    segments: Vec<[DVec2; 2]>,
}

impl Outline {
    /// Trace the boundary of every pixel whose opacity reaches `threshold`.
    /// Horizontal and vertical runs along the same edge are merged.
    pub fn from_device(device: &FixedPaintDevice, threshold: u8) -> Self {
        let (w, h) = (device.width(), device.height());
        let inside = |x: isize, y: isize| -> bool {
            x >= 0
                && y >= 0
                && (x as usize) < w
                && (y as usize) < h
                && device.opacity_at(x as usize, y as usize) >= threshold
        };

        let mut segments = Vec::new();

        // Horizontal edges: between row y-1 and row y
        for y in 0..=h as isize {
            let mut run_start: Option<isize> = None;
            for x in 0..=w as isize {
                let edge = x < w as isize && inside(x, y - 1) != inside(x, y);
                match (edge, run_start) {
                    (true, None) => run_start = Some(x),
                    (false, Some(start)) => {
                        segments.push([
                            DVec2::new(start as f64, y as f64),
                            DVec2::new(x as f64, y as f64),
                        ]);
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        // Vertical edges: between column x-1 and column x
        for x in 0..=w as isize {
            let mut run_start: Option<isize> = None;
            for y in 0..=h as isize {
                let edge = y < h as isize && inside(x - 1, y) != inside(x, y);
                match (edge, run_start) {
                    (true, None) => run_start = Some(y),
                    (false, Some(start)) => {
                        segments.push([
                            DVec2::new(x as f64, start as f64),
                            DVec2::new(x as f64, y as f64),
                        ]);
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[[DVec2; 2]] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// (min, max) corners of the outline
    pub fn bounding_rect(&self) -> Option<(DVec2, DVec2)> {
        let mut points = self.segments.iter().flatten();
        let first = *points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelFormat;
    use crate::types::DabRect;

    #[test]
    fn test_square_outline() {
        let mut device =
            FixedPaintDevice::with_rect(PixelFormat::Alpha8, DabRect::new(0, 0, 4, 4));
        for y in 1..3 {
            for x in 1..3 {
                device.data_mut()[y * 4 + x] = 255;
            }
        }
        let outline = Outline::from_device(&device, OUTLINE_THRESHOLD);
        // four merged sides
        assert_eq!(outline.segments().len(), 4);
        let (min, max) = outline.bounding_rect().unwrap();
        assert_eq!(min, DVec2::new(1.0, 1.0));
        assert_eq!(max, DVec2::new(3.0, 3.0));
    }

    #[test]
    fn test_empty_device_has_no_outline() {
        let device = FixedPaintDevice::with_rect(PixelFormat::Alpha8, DabRect::new(0, 0, 3, 3));
        let outline = Outline::from_device(&device, OUTLINE_THRESHOLD);
        assert!(outline.is_empty());
        assert!(outline.bounding_rect().is_none());
    }
}
