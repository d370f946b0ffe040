//! Scalar helpers shared by placement, quantization and rasterization.

use std::f64::consts::TAU;

/// Map any angle into [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let a = angle.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// Split a coordinate into its floor and the non-negative remainder
#[inline]
pub fn split_coordinate(coordinate: f64) -> (i32, f64) {
    let whole = coordinate.floor();
    (whole as i32, coordinate - whole)
}

/// Fractional part in [0, 1), also for negative inputs
#[inline]
pub fn positive_fraction(x: f64) -> f64 {
    split_coordinate(x).1
}

/// Round half up, matching integer pixel snapping of the placement code
#[inline]
pub fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

/// 8-bit fixed point multiply: a * b / 255, rounded
#[inline]
pub fn mul_u8(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 0x80;
    (((t >> 8) + t) >> 8) as u8
}

/// Bounding size of a `width`x`height` box after scaling and rotation
pub fn rotated_bounds(width: f64, height: f64, scale: f64, angle: f64) -> (f64, f64) {
    let w = width * scale;
    let h = height * scale;
    let (sin, cos) = angle.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    (w * cos + h * sin, w * sin + h * cos)
}
