//! Coloring input for mask generation.

use crate::pixel::FixedPaintDevice;

const TRANSPARENT: [u8; 16] = [0; 16];

/// Color fed into a dab while its coverage is computed. Consumed in
/// raster order: one `advance_column` per output pixel, one
/// `advance_row` per output row.
#[derive(Debug, Clone)]
pub enum Coloring<'a> {
    /// One encoded pixel for the whole dab
    Uniform(&'a [u8]),
    /// Per-pixel colors read from a device laid out like the dab
    PerPixel {
        device: &'a FixedPaintDevice,
        column: usize,
        row: usize,
    },
}

impl<'a> Coloring<'a> {
    /// Per-pixel coloring starting at the device's top-left pixel
    pub fn per_pixel(device: &'a FixedPaintDevice) -> Self {
        Coloring::PerPixel {
            device,
            column: 0,
            row: 0,
        }
    }

    /// Encoded color under the cursor. Reads past the device edge yield
    /// a transparent pixel.
    pub fn current_color(&self) -> &[u8] {
        match self {
            Coloring::Uniform(color) => *color,
            Coloring::PerPixel {
                device,
                column,
                row,
            } => device
                .pixel(*column, *row)
                .unwrap_or(&TRANSPARENT[..device.pixel_size()]),
        }
    }

    pub fn advance_column(&mut self) {
        if let Coloring::PerPixel { column, .. } = self {
            *column += 1;
        }
    }

    pub fn advance_row(&mut self) {
        if let Coloring::PerPixel { column, row, .. } = self {
            *column = 0;
            *row += 1;
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, Coloring::Uniform(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelFormat;
    use crate::types::DabRect;

    #[test]
    fn test_uniform_ignores_advancing() {
        let color = [1u8, 2, 3, 4];
        let mut coloring = Coloring::Uniform(&color);
        coloring.advance_column();
        coloring.advance_row();
        assert_eq!(coloring.current_color(), &color);
    }

    #[test]
    fn test_per_pixel_walks_raster_order() {
        let mut device =
            FixedPaintDevice::with_rect(PixelFormat::Alpha8, DabRect::new(0, 0, 2, 2));
        device.data_mut().copy_from_slice(&[10, 20, 30, 40]);

        let mut coloring = Coloring::per_pixel(&device);
        let mut seen = Vec::new();
        for _ in 0..2 {
            for _ in 0..2 {
                seen.push(coloring.current_color()[0]);
                coloring.advance_column();
            }
            coloring.advance_row();
        }
        assert_eq!(seen, vec![10, 20, 30, 40]);
        // past the last row
        assert_eq!(coloring.current_color(), &[0u8][..]);
    }
}
