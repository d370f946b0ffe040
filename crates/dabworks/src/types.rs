use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Integer rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DabRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DabRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered
    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// Same size, moved to the origin
    pub fn at_origin(&self) -> Self {
        Self::new(0, 0, self.width, self.height)
    }
}

/// A single stroke sample as delivered by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintInformation {
    /// Device position in canvas pixels
    pub pos: DVec2,
    /// Pen pressure 0.0-1.0
    pub pressure: f64,
    /// Tilt in degrees along x
    pub x_tilt: f64,
    /// Tilt in degrees along y
    pub y_tilt: f64,
    /// Barrel rotation in radians
    pub rotation: f64,
    /// Sample timestamp in milliseconds
    pub time_ms: f64,
    /// Canvas view is mirrored horizontally
    pub canvas_mirrored_h: bool,
    /// Canvas view is mirrored vertically
    pub canvas_mirrored_v: bool,
}

impl Default for PaintInformation {
    fn default() -> Self {
        Self {
            pos: DVec2::ZERO,
            pressure: 1.0,
            x_tilt: 0.0,
            y_tilt: 0.0,
            rotation: 0.0,
            time_ms: 0.0,
            canvas_mirrored_h: false,
            canvas_mirrored_v: false,
        }
    }
}

impl PaintInformation {
    /// Sample at a position with the given pressure
    pub fn at(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            pressure,
            ..Default::default()
        }
    }

    /// Interpolate between two samples; position is passed explicitly so
    /// callers can advance along an exact direction vector.
    pub fn mix(&self, other: &Self, t: f64, pos: DVec2) -> Self {
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Self {
            pos,
            pressure: lerp(self.pressure, other.pressure),
            x_tilt: lerp(self.x_tilt, other.x_tilt),
            y_tilt: lerp(self.y_tilt, other.y_tilt),
            rotation: lerp(self.rotation, other.rotation),
            time_ms: lerp(self.time_ms, other.time_ms),
            canvas_mirrored_h: self.canvas_mirrored_h,
            canvas_mirrored_v: self.canvas_mirrored_v,
        }
    }
}

/// Mirroring decided for a single dab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MirrorProperties {
    pub horizontal_mirror: bool,
    pub vertical_mirror: bool,
    pub coordinate_system_flipped: bool,
}

impl MirrorProperties {
    /// True when the dab needs no flipping
    pub fn is_empty(&self) -> bool {
        !self.horizontal_mirror && !self.vertical_mirror
    }
}

/// Where and how a dab lands on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DabPlacement {
    /// Integer origin and raster size
    pub rect: DabRect,
    /// Sub-pixel remainder in [0, 1) on each axis
    pub sub_pixel: DVec2,
    /// Angle the tip is rasterized with, after mirroring and quantization
    pub real_angle: f64,
    /// Scales after quantization
    pub scale_x: f64,
    pub scale_y: f64,
    /// Softness after quantization
    pub softness: f64,
    pub mirror: MirrorProperties,
}
