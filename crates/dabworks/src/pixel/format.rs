//! Pixel formats a dab can be produced in.
//!
//! The compositing library is only seen through this narrow interface:
//! a byte stride per pixel plus a handful of opacity primitives. Color
//! values cross the boundary as straight-alpha `[f32; 4]`.

use serde::{Deserialize, Serialize};

use crate::geometry::mul_u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Single 8-bit opacity channel
    Alpha8,
    /// 8-bit RGBA, straight alpha
    #[default]
    Rgba8,
    /// 16-bit RGBA in native endianness, straight alpha
    Rgba16,
    /// 32-bit float RGBA, straight alpha
    RgbaF32,
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

#[inline]
fn read_u16x4(pixel: &[u8]) -> [u16; 4] {
    bytemuck::pod_read_unaligned(&pixel[..8])
}

#[inline]
fn write_u16x4(pixel: &mut [u8], channels: [u16; 4]) {
    pixel[..8].copy_from_slice(bytemuck::bytes_of(&channels));
}

#[inline]
fn read_f32x4(pixel: &[u8]) -> [f32; 4] {
    bytemuck::pod_read_unaligned(&pixel[..16])
}

#[inline]
fn write_f32x4(pixel: &mut [u8], channels: [f32; 4]) {
    pixel[..16].copy_from_slice(bytemuck::bytes_of(&channels));
}

impl PixelFormat {
    /// Bytes per pixel
    #[inline]
    pub const fn pixel_size(self) -> usize {
        match self {
            PixelFormat::Alpha8 => 1,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgba16 => 8,
            PixelFormat::RgbaF32 => 16,
        }
    }

    /// Encode a straight-alpha color into a freshly allocated pixel
    pub fn encode(self, color: [f32; 4]) -> Vec<u8> {
        let mut pixel = vec![0u8; self.pixel_size()];
        self.write_color(&mut pixel, color);
        pixel
    }

    /// Encode a straight-alpha color into `pixel`
    pub fn write_color(self, pixel: &mut [u8], color: [f32; 4]) {
        match self {
            PixelFormat::Alpha8 => pixel[0] = to_u8(color[3]),
            PixelFormat::Rgba8 => {
                for (dst, c) in pixel[..4].iter_mut().zip(color) {
                    *dst = to_u8(c);
                }
            }
            PixelFormat::Rgba16 => write_u16x4(pixel, color.map(to_u16)),
            PixelFormat::RgbaF32 => write_f32x4(pixel, color),
        }
    }

    /// Encode an 8-bit RGBA value (as stored in tip images) into `pixel`
    pub fn write_rgba8(self, pixel: &mut [u8], rgba: [u8; 4]) {
        match self {
            PixelFormat::Alpha8 => pixel[0] = rgba[3],
            PixelFormat::Rgba8 => pixel[..4].copy_from_slice(&rgba),
            PixelFormat::Rgba16 => write_u16x4(pixel, rgba.map(|c| c as u16 * 257)),
            PixelFormat::RgbaF32 => write_f32x4(pixel, rgba.map(|c| c as f32 / 255.0)),
        }
    }

    /// Decode a pixel into straight-alpha RGBA. Alpha8 decodes as black.
    pub fn decode(self, pixel: &[u8]) -> [f32; 4] {
        match self {
            PixelFormat::Alpha8 => [0.0, 0.0, 0.0, pixel[0] as f32 / 255.0],
            PixelFormat::Rgba8 => [
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
                pixel[3] as f32 / 255.0,
            ],
            PixelFormat::Rgba16 => read_u16x4(pixel).map(|c| c as f32 / 65535.0),
            PixelFormat::RgbaF32 => read_f32x4(pixel),
        }
    }

    /// Opacity of a pixel scaled to 0..=255
    pub fn opacity_u8(self, pixel: &[u8]) -> u8 {
        match self {
            PixelFormat::Alpha8 => pixel[0],
            PixelFormat::Rgba8 => pixel[3],
            PixelFormat::Rgba16 => {
                let a = read_u16x4(pixel)[3] as u32;
                ((a * 255 + 32767) / 65535) as u8
            }
            PixelFormat::RgbaF32 => to_u8(read_f32x4(pixel)[3]),
        }
    }

    /// Replace the opacity of a pixel
    pub fn set_opacity_u8(self, pixel: &mut [u8], opacity: u8) {
        match self {
            PixelFormat::Alpha8 => pixel[0] = opacity,
            PixelFormat::Rgba8 => pixel[3] = opacity,
            PixelFormat::Rgba16 => {
                let mut ch = read_u16x4(pixel);
                ch[3] = opacity as u16 * 257;
                write_u16x4(pixel, ch);
            }
            PixelFormat::RgbaF32 => {
                let mut ch = read_f32x4(pixel);
                ch[3] = opacity as f32 / 255.0;
                write_f32x4(pixel, ch);
            }
        }
    }

    /// Scale the opacity of a pixel by `factor / 255`
    pub fn multiply_alpha(self, pixel: &mut [u8], factor: u8) {
        match self {
            PixelFormat::Alpha8 => pixel[0] = mul_u8(pixel[0], factor),
            PixelFormat::Rgba8 => pixel[3] = mul_u8(pixel[3], factor),
            PixelFormat::Rgba16 => {
                let mut ch = read_u16x4(pixel);
                ch[3] = ((ch[3] as u32 * factor as u32 + 127) / 255) as u16;
                write_u16x4(pixel, ch);
            }
            PixelFormat::RgbaF32 => {
                let mut ch = read_f32x4(pixel);
                ch[3] *= factor as f32 / 255.0;
                write_f32x4(pixel, ch);
            }
        }
    }

    /// Multiply the opacity of a run of pixels by an 8-bit mask, one mask
    /// value per pixel. Extra pixels or mask values are left alone.
    pub fn apply_alpha_u8_mask(self, pixels: &mut [u8], alpha: &[u8]) {
        for (pixel, &a) in pixels.chunks_exact_mut(self.pixel_size()).zip(alpha) {
            self.multiply_alpha(pixel, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PixelFormat; 4] = [
        PixelFormat::Alpha8,
        PixelFormat::Rgba8,
        PixelFormat::Rgba16,
        PixelFormat::RgbaF32,
    ];

    #[test]
    fn test_pixel_sizes() {
        assert_eq!(PixelFormat::Alpha8.pixel_size(), 1);
        assert_eq!(PixelFormat::Rgba8.pixel_size(), 4);
        assert_eq!(PixelFormat::Rgba16.pixel_size(), 8);
        assert_eq!(PixelFormat::RgbaF32.pixel_size(), 16);
    }

    #[test]
    fn test_opacity_primitives_agree_across_formats() {
        for format in ALL {
            let mut pixel = format.encode([1.0, 0.5, 0.25, 1.0]);
            assert_eq!(format.opacity_u8(&pixel), 255, "{:?}", format);

            format.multiply_alpha(&mut pixel, 128);
            let opacity = format.opacity_u8(&pixel);
            assert!((127..=129).contains(&opacity), "{:?}: {}", format, opacity);

            format.set_opacity_u8(&mut pixel, 0);
            assert_eq!(format.opacity_u8(&pixel), 0, "{:?}", format);
        }
    }

    #[test]
    fn test_rgba8_color_survives_decode() {
        let pixel = PixelFormat::Rgba16.encode([1.0, 0.0, 0.5, 1.0]);
        let color = PixelFormat::Rgba16.decode(&pixel);
        assert!((color[0] - 1.0).abs() < 1e-4);
        assert!((color[2] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_apply_alpha_mask() {
        let format = PixelFormat::Rgba8;
        let mut row = [0u8, 0, 0, 255, 10, 10, 10, 255, 20, 20, 20, 200];
        format.apply_alpha_u8_mask(&mut row, &[255, 0, 128]);
        assert_eq!(row[3], 255);
        assert_eq!(row[7], 0);
        assert_eq!(row[11], 100);
        // color channels are untouched
        assert_eq!(row[4], 10);
    }

    #[test]
    fn test_write_rgba8() {
        let mut pixel = [0u8; 8];
        PixelFormat::Rgba16.write_rgba8(&mut pixel, [255, 0, 0, 128]);
        assert_eq!(PixelFormat::Rgba16.opacity_u8(&pixel), 128);
    }
}
