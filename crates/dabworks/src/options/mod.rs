//! Per-dab options driven by settings and the current stroke sample

mod mirror;
mod sharpness;
mod spacing;
mod texture;

pub use mirror::MirrorOption;
pub use sharpness::SharpnessOption;
pub use spacing::SpacingOption;
pub use texture::TextureOption;

use crate::types::PaintInformation;

/// Sensor reading in 0..=1: pen pressure, or a constant 1 when the option
/// is not pressure driven
#[inline]
pub(crate) fn sensor_value(use_pressure: bool, info: &PaintInformation) -> f64 {
    if use_pressure {
        if info.pressure.is_finite() {
            info.pressure.clamp(0.0, 1.0)
        } else {
            0.0
        }
    } else {
        1.0
    }
}
