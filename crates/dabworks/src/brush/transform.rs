//! Affine resampling of brush tip images.
//!
//! The tip is scaled, then rotated (and shifted back so the rotated
//! bounds start at the origin), then translated by the sub-pixel offset.
//! Destination pixels are filled by inverse mapping with bilinear
//! filtering in premultiplied space; shrinking transforms supersample so
//! thin tip features are not skipped.

use std::f64::consts::TAU;

use glam::{DAffine2, DMat2, DVec2};
use image::{Rgba, RgbaImage};
use tracing::trace;

/// Supersampling cap per axis for strongly shrunk tips
const MAX_SUPERSAMPLE: u32 = 4;

/// Scale applied to a pure-translation transform so it is always
/// resampled through the filtering path.
const FAKE_SCALE: f64 = 1.0 - 10.0 * f64::EPSILON;

#[inline]
fn fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
}

/// Min/max of a `width`x`height` box mapped through `transform`
fn mapped_bounds(transform: &DAffine2, width: f64, height: f64) -> (DVec2, DVec2) {
    let corners = [
        DVec2::ZERO,
        DVec2::new(width, 0.0),
        DVec2::new(0.0, height),
        DVec2::new(width, height),
    ];
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for corner in corners {
        let p = transform.transform_point2(corner);
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

/// Transform placing a `width`x`height` tip into its output raster
pub fn brush_transform(
    width: f64,
    height: f64,
    scale_x: f64,
    scale_y: f64,
    rotation: f64,
    sub_pixel_x: f64,
    sub_pixel_y: f64,
) -> DAffine2 {
    let mut transform = DAffine2::from_scale(DVec2::new(scale_x, scale_y));

    if !fuzzy_eq(rotation, 0.0) && !fuzzy_eq(rotation, TAU) {
        transform = DAffine2::from_angle(rotation) * transform;
        let (min, _) = mapped_bounds(&transform, width, height);
        transform = DAffine2::from_translation(-min) * transform;
    }

    DAffine2::from_translation(DVec2::new(sub_pixel_x, sub_pixel_y)) * transform
}

/// Size of the raster a transformed tip needs. One extra pixel is added
/// on every axis with a nonzero sub-pixel offset so partial coverage at
/// the trailing edge is kept. Never smaller than 1x1.
pub fn image_size(
    width: u32,
    height: u32,
    scale_x: f64,
    scale_y: f64,
    rotation: f64,
    sub_pixel_x: f64,
    sub_pixel_y: f64,
) -> (i32, i32) {
    let transform = brush_transform(
        width as f64,
        height as f64,
        scale_x,
        scale_y,
        rotation,
        0.0,
        0.0,
    );
    let (min, max) = mapped_bounds(&transform, width as f64, height as f64);
    let extent = max - min;

    let axis = |len: f64, sub_pixel: f64| -> i32 {
        let base = if len.is_finite() {
            ((len - 1e-9).ceil() as i32).max(1)
        } else {
            1
        };
        base + i32::from(sub_pixel != 0.0)
    };

    (axis(extent.x, sub_pixel_x), axis(extent.y, sub_pixel_y))
}

/// Sample `image` at continuous pixel coordinates with bilinear weights.
/// Returns premultiplied color and alpha, each in 0..=255 units.
fn sample_premultiplied(image: &RgbaImage, p: DVec2) -> [f64; 4] {
    let fx = p.x - 0.5;
    let fy = p.y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let (w, h) = (image.width() as i64, image.height() as i64);
    let mut acc = [0.0f64; 4];

    let taps = [
        (x0 as i64, y0 as i64, (1.0 - tx) * (1.0 - ty)),
        (x0 as i64 + 1, y0 as i64, tx * (1.0 - ty)),
        (x0 as i64, y0 as i64 + 1, (1.0 - tx) * ty),
        (x0 as i64 + 1, y0 as i64 + 1, tx * ty),
    ];

    for (x, y, weight) in taps {
        if weight <= 0.0 || x < 0 || y < 0 || x >= w || y >= h {
            continue;
        }
        let Rgba([r, g, b, a]) = *image.get_pixel(x as u32, y as u32);
        let wa = weight * a as f64;
        acc[0] += r as f64 * wa / 255.0;
        acc[1] += g as f64 * wa / 255.0;
        acc[2] += b as f64 * wa / 255.0;
        acc[3] += wa;
    }

    acc
}

/// Resample `image` through scale, rotation and sub-pixel translation.
pub fn transform_tip(
    image: &RgbaImage,
    scale_x: f64,
    scale_y: f64,
    rotation: f64,
    sub_pixel_x: f64,
    sub_pixel_y: f64,
) -> RgbaImage {
    let (out_w, out_h) = image_size(
        image.width(),
        image.height(),
        scale_x,
        scale_y,
        rotation,
        sub_pixel_x,
        sub_pixel_y,
    );
    let mut output = RgbaImage::new(out_w as u32, out_h as u32);

    if image.width() == 0 || image.height() == 0 {
        return output;
    }

    let mut transform = brush_transform(
        image.width() as f64,
        image.height() as f64,
        scale_x,
        scale_y,
        rotation,
        sub_pixel_x,
        sub_pixel_y,
    );

    // Pure translations must still go through the smoothing path
    if transform.matrix2 == DMat2::IDENTITY {
        transform = transform * DAffine2::from_scale(DVec2::splat(FAKE_SCALE));
    }

    if transform.matrix2.determinant().abs() < f64::EPSILON {
        trace!("transform_tip: degenerate transform, returning empty raster");
        return output;
    }
    let inverse = transform.inverse();

    let min_scale = scale_x.abs().min(scale_y.abs());
    let samples = if min_scale < 1.0 {
        ((1.0 / min_scale).ceil() as u32).clamp(1, MAX_SUPERSAMPLE)
    } else {
        1
    };
    let inv_samples = 1.0 / samples as f64;
    let sample_weight = inv_samples * inv_samples;

    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let mut acc = [0.0f64; 4];
        for sy in 0..samples {
            for sx in 0..samples {
                let dst = DVec2::new(
                    x as f64 + (sx as f64 + 0.5) * inv_samples,
                    y as f64 + (sy as f64 + 0.5) * inv_samples,
                );
                let sample = sample_premultiplied(image, inverse.transform_point2(dst));
                for (a, s) in acc.iter_mut().zip(sample) {
                    *a += s * sample_weight;
                }
            }
        }

        let alpha = acc[3];
        if alpha <= 0.0 {
            continue;
        }
        let unpremultiply = |c: f64| (c * 255.0 / alpha).round().clamp(0.0, 255.0) as u8;
        *pixel = Rgba([
            unpremultiply(acc[0]),
            unpremultiply(acc[1]),
            unpremultiply(acc[2]),
            alpha.round().clamp(0.0, 255.0) as u8,
        ]);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn gradient_tip(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let v = ((x * 31 + y * 17) % 256) as u8;
            Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn test_image_size_identity() {
        assert_eq!(image_size(64, 32, 1.0, 1.0, 0.0, 0.0, 0.0), (64, 32));
    }

    #[test]
    fn test_image_size_sub_pixel_expansion() {
        assert_eq!(image_size(64, 32, 1.0, 1.0, 0.0, 0.3, 0.0), (65, 32));
        assert_eq!(image_size(64, 32, 1.0, 1.0, 0.0, 0.3, 0.7), (65, 33));
    }

    #[test]
    fn test_image_size_rotated() {
        let (w, h) = image_size(64, 32, 1.0, 1.0, PI / 2.0, 0.0, 0.0);
        assert_eq!((w, h), (32, 64));
    }

    #[test]
    fn test_image_size_tiny_scale_is_one_pixel() {
        assert_eq!(image_size(10, 10, 0.001, 0.001, 0.0, 0.0, 0.0), (1, 1));
    }

    #[test]
    fn test_identity_transform_reproduces_tip() {
        let tip = gradient_tip(9, 7);
        let out = transform_tip(&tip, 1.0, 1.0, 0.0, 0.0, 0.0);
        assert_eq!(out.dimensions(), tip.dimensions());
        for (a, b) in out.pixels().zip(tip.pixels()) {
            for c in 0..4 {
                assert!((a.0[c] as i32 - b.0[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_sub_pixel_shift_spreads_coverage() {
        let tip = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let out = transform_tip(&tip, 1.0, 1.0, 0.0, 0.5, 0.0);
        assert_eq!(out.dimensions(), (2, 1));
        let left = out.get_pixel(0, 0).0[3] as i32;
        let right = out.get_pixel(1, 0).0[3] as i32;
        assert!((left - 128).abs() <= 1);
        assert!((right - 128).abs() <= 1);
    }

    #[test]
    fn test_upscale_doubles_size() {
        let tip = gradient_tip(8, 8);
        let out = transform_tip(&tip, 2.0, 2.0, 0.0, 0.0, 0.0);
        assert_eq!(out.dimensions(), (16, 16));
        // interior stays opaque
        assert_eq!(out.get_pixel(8, 8).0[3], 255);
    }

    #[test]
    fn test_rotation_keeps_content_in_bounds() {
        let tip = RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255]));
        let out = transform_tip(&tip, 1.0, 1.0, PI / 4.0, 0.0, 0.0);
        let coverage: f64 = out.pixels().map(|p| p.0[3] as f64 / 255.0).sum();
        // rotated area is preserved up to edge antialiasing
        assert!((coverage - 200.0).abs() < 15.0, "coverage={}", coverage);
    }

    #[test]
    fn test_empty_tip_yields_transparent_pixel() {
        let tip = RgbaImage::new(0, 0);
        let out = transform_tip(&tip, 1.0, 1.0, 0.0, 0.0, 0.0);
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
